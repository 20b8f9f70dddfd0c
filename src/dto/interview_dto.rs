use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::candidate::CandidateRecord;
use crate::models::question::Question;
use crate::models::session::{CandidateProfile, SessionStatus};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartInterviewRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Non-empty text switches generation to resume-grounded mode.
    #[serde(default)]
    pub resume_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub questions: Vec<Question>,
    pub ai_used: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(length(min = 1))]
    pub question_id: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub time_used: u32,
    #[serde(default)]
    pub selected_index: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswerResponse {
    pub ok: bool,
    pub finished: bool,
}

/// Shared body for finish/pause/resume/discard.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRef {
    #[validate(length(min = 1))]
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinishInterviewResponse {
    pub candidate: CandidateRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusChangeResponse {
    pub ok: bool,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCandidateRequest {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCandidateResponse {
    pub ok: bool,
    pub candidate: CandidateProfile,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateOptionsRequest {
    #[validate(length(min = 1))]
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOptionsResponse {
    pub options: Vec<String>,
}
