use axum::{extract::State, http::HeaderMap, Extension, Json};

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{RecommendationRequest, RecommendationResponse},
    routes::AppState,
};

/// Header carrying the caller's user id, when known
pub const USER_ID_HEADER: &str = "x-user-id";

/// Handler for the recommendations endpoint
///
/// Malformed requests are rejected with 400 here; everything past validation is
/// answered by the engine, which degrades to an empty response on failure.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    request.validate()?;

    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty());

    tracing::info!(
        request_id = %request_id,
        keywords = request.product_keywords.len(),
        max_recommendations = request.max_recommendations,
        "Processing recommendation request"
    );

    let response = state.engine.get_recommendations(&request, user_id).await;

    tracing::info!(
        request_id = %request_id,
        strategy = %response.strategy,
        returned = response.recommendations.len(),
        "Recommendation request completed"
    );

    Ok(Json(response))
}
