use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Paused,
    Finished,
}

/// Identity captured from the resume upload or the start request. Fields
/// may be empty at creation and augmented later.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One submitted answer. `is_correct` is defined only when the question is
/// multiple-choice and an option was selected; `score`/`feedback` carry the
/// free-text assessment (LLM or deterministic fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub selected_index: Option<usize>,
    #[serde(default)]
    pub is_correct: Option<bool>,
    pub time_used: u32,
    #[serde(default)]
    pub score: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub candidate: CandidateProfile,
    /// Exactly six questions, two per difficulty tier, fixed at creation.
    pub questions: Vec<Question>,
    /// Keyed by question id; resubmission for a question replaces the
    /// stored answer rather than appending.
    #[serde(default)]
    pub answers: BTreeMap<String, Answer>,
    pub current_question_index: usize,
    pub status: SessionStatus,
    #[serde(default)]
    pub final_score: Option<u8>,
    #[serde(default)]
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(candidate: CandidateProfile, questions: Vec<Question>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            candidate,
            questions,
            answers: BTreeMap::new(),
            current_question_index: 0,
            status: SessionStatus::InProgress,
            final_score: None,
            summary: None,
            created_at: Utc::now(),
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// True once every question has been answered; the state machine
    /// transitions to `Finished` exactly at this point.
    pub fn all_answered(&self) -> bool {
        self.current_question_index == self.questions.len()
    }
}
