use serde::Serialize;

use crate::models::candidate::CandidateRecord;
use crate::models::session::Session;

#[derive(Debug, Clone, Serialize)]
pub struct CandidatesResponse {
    pub candidates: Vec<CandidateRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateDetailResponse {
    pub candidate: CandidateRecord,
    pub session: Session,
}
