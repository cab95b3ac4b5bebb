use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{HistoryStore, RecommendationEngine},
};

pub mod history;
pub mod recommendations;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RecommendationEngine>,
    /// Generated image references per design session
    pub history: HistoryStore<String>,
}

impl AppState {
    pub fn new(engine: RecommendationEngine, history_capacity: usize, max_sessions: usize) -> Self {
        Self {
            engine: Arc::new(engine),
            history: HistoryStore::new(history_capacity, max_sessions),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommendations", post(recommendations::recommend))
        .route(
            "/sessions/:session_id/history",
            get(history::show).post(history::record).delete(history::clear),
        )
        .route("/sessions/:session_id/undo", post(history::undo))
        .route("/sessions/:session_id/redo", post(history::redo))
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let sessions = state.history.session_count().await;
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "active_sessions": sessions })),
    )
}
