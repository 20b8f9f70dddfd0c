pub mod file;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::candidate::CandidateRecord;
use crate::models::session::Session;

/// The persisted document: every mutation rewrites it wholesale, which is
/// acceptable at this scale (single writer per session, no WAL).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub sessions: HashMap<String, Session>,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

/// Storage boundary injected into the session machine and summarizer. The
/// core logic never assumes a specific backing store.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_session(&self, id: &str) -> Result<Option<Session>>;
    async fn put_session(&self, session: &Session) -> Result<()>;
    /// Returns whether a session existed. The only deletion path.
    async fn delete_session(&self, id: &str) -> Result<bool>;

    async fn append_candidate(&self, record: &CandidateRecord) -> Result<()>;
    async fn list_candidates(&self) -> Result<Vec<CandidateRecord>>;
    async fn get_candidate(&self, id: &str) -> Result<Option<CandidateRecord>>;
    async fn find_candidate_by_session(&self, session_id: &str)
        -> Result<Option<CandidateRecord>>;
}
