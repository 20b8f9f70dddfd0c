use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::interview_dto::{
    FinishInterviewResponse, GenerateOptionsRequest, GenerateOptionsResponse, SessionRef,
    StartInterviewRequest, StartInterviewResponse, StatusChangeResponse, SubmitAnswerRequest,
    SubmitAnswerResponse, UpdateCandidateRequest, UpdateCandidateResponse,
};
use crate::error::Error;
use crate::models::session::CandidateProfile;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let resume_text = req
        .resume_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    // Resume-grounded mode hard-fails rather than silently serving the
    // static bank: the caller asked for resume-specific questions.
    let (questions, ai_used) = match resume_text {
        Some(text) => {
            if !state.question_service.ai_configured() {
                return Err(Error::BadRequest(
                    "AI key missing. Set GOOGLE_API_KEY on the server.".to_string(),
                ));
            }
            (state.question_service.generate_from_resume(text).await?, true)
        }
        None => (state.question_service.static_set(), false),
    };

    let candidate = CandidateProfile {
        name: req.name,
        email: req.email,
        phone: req.phone,
    };
    let session = state.session_service.create(candidate, questions).await?;

    Ok(Json(StartInterviewResponse {
        session_id: session.id,
        questions: session.questions,
        ai_used,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(req): Json<SubmitAnswerRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;

    let outcome = state
        .session_service
        .submit_answer(
            &req.session_id,
            &req.question_id,
            &req.answer,
            req.time_used,
            req.selected_index,
        )
        .await?;

    Ok(Json(SubmitAnswerResponse {
        ok: true,
        finished: outcome.finished,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn finish_interview(
    State(state): State<AppState>,
    Json(req): Json<SessionRef>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let candidate = state.session_service.finish(&req.session_id).await?;
    Ok(Json(FinishInterviewResponse { candidate }).into_response())
}

#[axum::debug_handler]
pub async fn pause_interview(
    State(state): State<AppState>,
    Json(req): Json<SessionRef>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let status = state.session_service.pause(&req.session_id).await?;
    Ok(Json(StatusChangeResponse { ok: true, status }).into_response())
}

#[axum::debug_handler]
pub async fn resume_interview(
    State(state): State<AppState>,
    Json(req): Json<SessionRef>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let status = state.session_service.resume(&req.session_id).await?;
    Ok(Json(StatusChangeResponse { ok: true, status }).into_response())
}

#[axum::debug_handler]
pub async fn discard_interview(
    State(state): State<AppState>,
    Json(req): Json<SessionRef>,
) -> crate::error::Result<Response> {
    req.validate()?;
    state.session_service.discard(&req.session_id).await?;
    Ok(Json(serde_json::json!({ "ok": true })).into_response())
}

#[axum::debug_handler]
pub async fn update_candidate(
    State(state): State<AppState>,
    Json(req): Json<UpdateCandidateRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let candidate = state
        .session_service
        .update_candidate(&req.session_id, req.name, req.email, req.phone)
        .await?;
    Ok(Json(UpdateCandidateResponse {
        ok: true,
        candidate,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn generate_options(
    State(state): State<AppState>,
    Json(req): Json<GenerateOptionsRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    if !state.ai_service.is_configured() {
        return Err(Error::BadRequest("AI key missing".to_string()));
    }
    let options = state.ai_service.generate_options(&req.text).await?;
    Ok(Json(GenerateOptionsResponse { options }).into_response())
}
