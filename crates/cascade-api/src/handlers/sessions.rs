use crate::error::{ApiError, ApiResult};
use crate::responses::{SessionHistory, SessionList};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;

/// List every known session, in creation order.
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<SessionList>> {
    Ok(Json(state.api.list_sessions()?))
}

/// Grouped history of one session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionHistory>> {
    let history = state
        .api
        .get_session_history(&session_id)?
        .ok_or(ApiError::SessionNotFound(session_id))?;
    Ok(Json(history))
}
