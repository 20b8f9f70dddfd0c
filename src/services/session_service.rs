use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::candidate::CandidateRecord;
use crate::models::question::Question;
use crate::models::session::{Answer, CandidateProfile, Session, SessionStatus};
use crate::services::ai_service::GeminiService;
use crate::services::scoring;
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub finished: bool,
}

/// Owns the session lifecycle: `in-progress` -> `paused`/`finished`, answer
/// submission, discard, and the one-shot completion that produces the
/// Candidate record. Each session is mutated under its own async lock.
#[derive(Clone)]
pub struct SessionService {
    storage: Arc<dyn Storage>,
    ai: GeminiService,
    locks: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl SessionService {
    pub fn new(storage: Arc<dyn Storage>, ai: GeminiService) -> Self {
        Self {
            storage,
            ai,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock_for(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("session lock registry poisoned");
        locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn forget_lock(&self, session_id: &str) {
        let mut locks = self.locks.lock().expect("session lock registry poisoned");
        locks.remove(session_id);
    }

    pub async fn create(
        &self,
        candidate: CandidateProfile,
        questions: Vec<Question>,
    ) -> Result<Session> {
        let session = Session::new(candidate, questions);
        self.storage.put_session(&session).await?;
        tracing::info!(session_id = %session.id, "session created");
        Ok(session)
    }

    pub async fn get(&self, session_id: &str) -> Result<Session> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    /// Accepts an answer for the current question, advancing the pointer by
    /// exactly one. The submission must reference the current question by
    /// id: a past or future question is a validation error, an unknown id
    /// is NotFound, and neither mutates the session. Submitting the last
    /// answer completes the session.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer_text: &str,
        time_used: u32,
        selected_index: Option<usize>,
    ) -> Result<SubmitOutcome> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut session = self.get(session_id).await?;
        match session.status {
            SessionStatus::Finished => {
                return Err(Error::BadRequest("Session already finished".to_string()))
            }
            SessionStatus::Paused => {
                return Err(Error::BadRequest(
                    "Session is paused; resume before answering".to_string(),
                ))
            }
            SessionStatus::InProgress => {}
        }

        let current = session
            .current_question()
            .ok_or_else(|| Error::Internal("in-progress session has no current question".into()))?
            .clone();
        if current.id != question_id {
            return if session.questions.iter().any(|q| q.id == question_id) {
                Err(Error::BadRequest(
                    "Question is not the current question".to_string(),
                ))
            } else {
                Err(Error::NotFound("Question not found".to_string()))
            };
        }

        let time_used = time_used.min(current.time_limit);
        let is_correct = scoring::choice_correctness(&current, selected_index);

        // Free-text answers are scored now, LLM first when configured; any
        // upstream failure falls back to the deterministic formula and is
        // never surfaced to the caller.
        let (score, feedback) = if current.is_multiple_choice() {
            (None, None)
        } else {
            self.assess_free_text(&current, answer_text, time_used).await
        };

        session.answers.insert(
            current.id.clone(),
            Answer {
                question_id: current.id.clone(),
                text: answer_text.to_string(),
                selected_index,
                is_correct,
                time_used,
                score,
                feedback,
            },
        );
        session.current_question_index += 1;

        let finished = session.all_answered();
        if finished {
            self.complete(&mut session).await?;
        }
        self.storage.put_session(&session).await?;

        Ok(SubmitOutcome { finished })
    }

    async fn assess_free_text(
        &self,
        question: &Question,
        answer_text: &str,
        time_used: u32,
    ) -> (Option<u8>, Option<String>) {
        if self.ai.is_configured() {
            match self.ai.assess_answer(question, answer_text, time_used).await {
                Ok(assessment) => {
                    return (Some(assessment.score), Some(assessment.feedback));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "AI answer assessment failed, using fallback");
                }
            }
        }
        let score = scoring::fallback_score(question, answer_text, time_used);
        let feedback = scoring::fallback_feedback(question, score);
        (Some(score), Some(feedback))
    }

    /// Runs exactly once, on the submission that answers the last question:
    /// computes the final score, synthesizes the summary (LLM with
    /// templated fallback), flips the session to finished and appends the
    /// immutable Candidate record.
    async fn complete(&self, session: &mut Session) -> Result<()> {
        let score = scoring::overall_score(session);
        let summary = if self.ai.is_configured() {
            match self.ai.summarize_session(session).await {
                Ok(verdict) => verdict.summary,
                Err(e) => {
                    tracing::warn!(error = %e, "AI summary failed, using templated summary");
                    scoring::bucket_summary(score).to_string()
                }
            }
        } else {
            scoring::bucket_summary(score).to_string()
        };

        session.status = SessionStatus::Finished;
        session.final_score = Some(score);
        session.summary = Some(summary.clone());

        let name = if session.candidate.name.trim().is_empty() {
            "Unknown".to_string()
        } else {
            session.candidate.name.clone()
        };
        let record = CandidateRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            email: session.candidate.email.clone(),
            score,
            summary,
            session_id: session.id.clone(),
            created_at: Utc::now(),
        };
        self.storage.append_candidate(&record).await?;
        tracing::info!(session_id = %session.id, score, "session finished");
        Ok(())
    }

    /// Returns the Candidate record of a finished session. Idempotent: the
    /// record was created when the last answer was submitted, so repeated
    /// calls return the same record and never re-score.
    pub async fn finish(&self, session_id: &str) -> Result<CandidateRecord> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let session = self.get(session_id).await?;
        if session.status != SessionStatus::Finished {
            return Err(Error::BadRequest(
                "Interview is not complete yet".to_string(),
            ));
        }
        self.storage
            .find_candidate_by_session(session_id)
            .await?
            .ok_or_else(|| {
                Error::Internal("finished session has no candidate record".to_string())
            })
    }

    pub async fn pause(&self, session_id: &str) -> Result<SessionStatus> {
        self.transition(session_id, SessionStatus::InProgress, SessionStatus::Paused)
            .await
    }

    pub async fn resume(&self, session_id: &str) -> Result<SessionStatus> {
        self.transition(session_id, SessionStatus::Paused, SessionStatus::InProgress)
            .await
    }

    async fn transition(
        &self,
        session_id: &str,
        from: SessionStatus,
        to: SessionStatus,
    ) -> Result<SessionStatus> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut session = self.get(session_id).await?;
        if session.status != from {
            return Err(Error::BadRequest(format!(
                "Cannot move session from {:?} to {:?}",
                session.status, to
            )));
        }
        session.status = to;
        self.storage.put_session(&session).await?;
        Ok(to)
    }

    /// Removes the session and its answers entirely. The only deletion
    /// path; Candidate records are append-only and survive.
    pub async fn discard(&self, session_id: &str) -> Result<()> {
        let lock = self.lock_for(session_id);
        {
            let _guard = lock.lock().await;
            if !self.storage.delete_session(session_id).await? {
                return Err(Error::NotFound("Session not found".to_string()));
            }
        }
        self.forget_lock(session_id);
        tracing::info!(session_id, "session discarded");
        Ok(())
    }

    /// Augments the candidate identity on a live session; empty updates
    /// leave the existing value in place.
    pub async fn update_candidate(
        &self,
        session_id: &str,
        name: Option<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<CandidateProfile> {
        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let mut session = self.get(session_id).await?;
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            session.candidate.name = name;
        }
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            session.candidate.email = email;
        }
        if let Some(phone) = phone.filter(|p| !p.trim().is_empty()) {
            session.candidate.phone = Some(phone);
        }
        self.storage.put_session(&session).await?;
        Ok(session.candidate)
    }
}
