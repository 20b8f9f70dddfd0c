use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The immutable result record produced when a session finishes. Appended
/// once per session and never re-scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub score: u8,
    pub summary: String,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}
