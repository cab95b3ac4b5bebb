use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    routes::AppState,
    services::history::HistorySnapshot,
};

#[derive(Debug, Deserialize)]
pub struct RecordImageRequest {
    pub image: String,
    /// Start the session over with this image instead of appending
    #[serde(default)]
    pub reset: bool,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub current: String,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Appends (or resets to) a generated image
pub async fn record(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<RecordImageRequest>,
) -> AppResult<(StatusCode, Json<HistorySnapshot<String>>)> {
    let image = request.image.trim().to_string();
    if image.is_empty() {
        return Err(AppError::InvalidInput("image must not be empty".to_string()));
    }

    let snapshot = if request.reset {
        state.history.store(&session_id, image).await
    } else {
        state.history.push(&session_id, image).await
    };

    tracing::debug!(session_id = %session_id, entries = snapshot.entries.len(), "Recorded image");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn show(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<HistorySnapshot<String>>> {
    state
        .history
        .snapshot(&session_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No history for session {}", session_id)))
}

pub async fn undo(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<StepResponse>> {
    let current = state
        .history
        .undo(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound("Nothing to undo".to_string()))?;
    step(&state, &session_id, current).await
}

pub async fn redo(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<StepResponse>> {
    let current = state
        .history
        .redo(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound("Nothing to redo".to_string()))?;
    step(&state, &session_id, current).await
}

pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<StatusCode> {
    if state.history.clear(&session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("No history for session {}", session_id)))
    }
}

async fn step(state: &AppState, session_id: &str, current: String) -> AppResult<Json<StepResponse>> {
    Ok(Json(StepResponse {
        current,
        can_undo: state.history.can_undo(session_id).await,
        can_redo: state.history.can_redo(session_id).await,
    }))
}
