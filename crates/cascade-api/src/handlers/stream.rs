use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::Response;
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;

#[derive(Debug, Deserialize)]
pub struct AskQuestionRequest {
    pub question: String,
}

/// Ask a question and stream the session as newline-delimited JSON.
///
/// Each line is one frame; the body ends when the session reaches a
/// terminal state.
pub async fn ask_question_stream(
    State(state): State<AppState>,
    Json(req): Json<AskQuestionRequest>,
) -> ApiResult<Response> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let lines = state
        .api
        .ask_question_stream(req.question)
        .map(|line| Ok::<_, Infallible>(format!("{line}\n")));

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(lines))
        .map_err(|e| ApiError::Internal(e.into()))?;

    Ok(response)
}
