use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
};

use crate::dto::candidate_dto::{CandidateDetailResponse, CandidatesResponse};
use crate::error::Error;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_candidates(State(state): State<AppState>) -> crate::error::Result<Response> {
    let candidates = state.storage.list_candidates().await?;
    Ok(Json(CandidatesResponse { candidates }).into_response())
}

#[axum::debug_handler]
pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> crate::error::Result<Response> {
    let candidate = state
        .storage
        .get_candidate(&id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;

    let session = state
        .storage
        .get_session(&candidate.session_id)
        .await?
        .ok_or_else(|| Error::NotFound("Session not found".to_string()))?;

    Ok(Json(CandidateDetailResponse { candidate, session }).into_response())
}
