use std::sync::OnceLock;

use rand::seq::SliceRandom;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::question::{Difficulty, Question};
use crate::services::ai_service::GeminiService;

/// Static bank entries: free-text only, scored by the rule-based heuristic.
const EASY_BANK: &[(&str, &[&str])] = &[
    (
        "Tell me about yourself and why you're interested in this role.",
        &["experience", "skills", "interest", "background"],
    ),
    (
        "What are your greatest strengths and how do they relate to this position?",
        &["strengths", "skills", "advantage", "excel"],
    ),
    (
        "Describe a typical day in your current or most recent role.",
        &["daily", "routine", "responsibilities", "tasks"],
    ),
    (
        "What motivates you to do your best work?",
        &["motivation", "drive", "passion", "goal"],
    ),
];

const MEDIUM_BANK: &[(&str, &[&str])] = &[
    (
        "Describe a challenging project you worked on. What was your approach and what did you learn?",
        &["challenge", "project", "approach", "solution", "learned"],
    ),
    (
        "How do you handle working under pressure or tight deadlines?",
        &["pressure", "deadline", "prioritize", "organize"],
    ),
    (
        "Tell me about a time you had to work with a difficult team member. How did you handle it?",
        &["conflict", "team", "resolution", "communication"],
    ),
    (
        "Describe a situation where you had to learn a new technology quickly. How did you approach it?",
        &["learn", "technology", "quickly", "adapt"],
    ),
];

const HARD_BANK: &[(&str, &[&str])] = &[
    (
        "Design a system that can handle 1 million concurrent users. Walk me through your architecture decisions and trade-offs.",
        &["scalability", "architecture", "load balancing", "caching", "distributed"],
    ),
    (
        "Explain how you would implement a real-time collaborative editing system. Consider conflict resolution and data consistency.",
        &["real-time", "conflict resolution", "consistency", "synchronization"],
    ),
    (
        "A critical system in production is performing poorly. Walk me through your debugging and optimization process.",
        &["debugging", "performance", "monitoring", "bottleneck"],
    ),
    (
        "Design a recommendation system for an e-commerce platform. How would you handle cold start and relevance?",
        &["recommendation", "cold start", "relevance", "data"],
    ),
];

#[derive(Clone)]
pub struct QuestionService {
    ai: GeminiService,
}

impl QuestionService {
    pub fn new(ai: GeminiService) -> Self {
        Self { ai }
    }

    pub fn ai_configured(&self) -> bool {
        self.ai.is_configured()
    }

    /// Samples two questions per tier from the static bank, free-text only,
    /// in the required Easy,Easy,Medium,Medium,Hard,Hard order.
    pub fn static_set(&self) -> Vec<Question> {
        let mut rng = rand::thread_rng();
        let mut questions = Vec::with_capacity(6);
        for (bank, difficulty) in [
            (EASY_BANK, Difficulty::Easy),
            (MEDIUM_BANK, Difficulty::Medium),
            (HARD_BANK, Difficulty::Hard),
        ] {
            for (text, keywords) in bank.choose_multiple(&mut rng, 2).copied() {
                questions.push(Question::free_text(text, difficulty, keywords));
            }
        }
        questions
    }

    /// Resume-grounded generation. Hard-fails on any shape violation so the
    /// caller never silently receives non-resume-specific questions.
    pub async fn generate_from_resume(&self, resume_text: &str) -> Result<Vec<Question>> {
        let raw = self.ai.generate_resume_questions(resume_text).await?;
        if raw.len() < 6 {
            return Err(Error::UpstreamGeneration(format!(
                "expected 6 questions, got {}",
                raw.len()
            )));
        }

        let mut drafts = Vec::with_capacity(6);
        for item in raw.iter().take(6) {
            let mut draft = coerce_question(item)?;
            if draft.options.len() != 4 {
                // One-shot regeneration for this question only; a second
                // failure fails the whole operation.
                match self.ai.generate_options(&draft.text).await {
                    Ok(regenerated) if regenerated.len() == 4 => draft.options = regenerated,
                    Ok(_) | Err(_) => {}
                }
            }
            if draft.options.len() != 4 {
                return Err(Error::UpstreamGeneration(format!(
                    "question lacks 4 usable options: {}",
                    draft.text
                )));
            }
            if let Some(idx) = draft.correct_index {
                if idx >= draft.options.len() {
                    return Err(Error::UpstreamGeneration(
                        "correct_index out of range".to_string(),
                    ));
                }
            }
            drafts.push(draft);
        }

        order_by_difficulty(drafts)
    }
}

/// Maps one raw model item into a question, deriving the time limit from
/// the difficulty and collapsing whatever option shape came back.
fn coerce_question(item: &JsonValue) -> Result<Question> {
    let text = item
        .get("text")
        .and_then(|t| t.as_str())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::UpstreamGeneration("question without text".to_string()))?;

    let difficulty = match item.get("difficulty").and_then(|d| d.as_str()) {
        Some("Easy") => Difficulty::Easy,
        Some("Medium") => Difficulty::Medium,
        Some("Hard") => Difficulty::Hard,
        other => {
            return Err(Error::UpstreamGeneration(format!(
                "unknown difficulty {:?}",
                other
            )))
        }
    };

    let keywords = item
        .get("keywords")
        .and_then(|k| k.as_array())
        .map(|a| {
            a.iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    let mut options = normalize_options(item);
    options.truncate(4);

    let correct_index = item
        .get("correct_index")
        .or_else(|| item.get("correctIndex"))
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .filter(|v| *v < 4);

    Ok(Question {
        id: uuid::Uuid::new_v4().to_string(),
        text: text.to_string(),
        difficulty,
        time_limit: difficulty.default_time_limit(),
        options,
        correct_index,
        keywords,
    })
}

/// Collapses the malformed option shapes models produce into a list of
/// trimmed strings, in priority order: an array under `options`, `choices`
/// or `answers`; a delimited string under `options`; options embedded in
/// the question text after an "Options:" marker. Anything else yields an
/// empty list (the "no usable options" terminal case).
pub fn normalize_options(item: &JsonValue) -> Vec<String> {
    for field in ["options", "choices", "answers"] {
        if let Some(values) = item.get(field).and_then(|v| v.as_array()) {
            let options: Vec<String> = values
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !options.is_empty() {
                return options;
            }
        }
    }

    if let Some(joined) = item.get("options").and_then(|v| v.as_str()) {
        let options = split_delimited(joined);
        if !options.is_empty() {
            return options;
        }
    }

    if let Some(text) = item.get("text").and_then(|v| v.as_str()) {
        if let Some(embedded) = options_marker().find(text) {
            return split_delimited(&text[embedded.end()..])
                .into_iter()
                .map(|line| choice_prefix().replace(&line, "").trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
        }
    }

    Vec::new()
}

fn split_delimited(raw: &str) -> Vec<String> {
    delimiter()
        .split(raw)
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

fn delimiter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n|;|\||,").expect("valid regex"))
}

fn options_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Options?:").expect("valid regex"))
}

fn choice_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(?[A-Da-d][)\.]\s*").expect("valid regex"))
}

/// Enforces the 2/2/2 distribution and the fixed tier ordering.
fn order_by_difficulty(drafts: Vec<Question>) -> Result<Vec<Question>> {
    let mut by_tier: std::collections::HashMap<Difficulty, Vec<Question>> =
        std::collections::HashMap::new();
    for draft in drafts {
        by_tier.entry(draft.difficulty).or_default().push(draft);
    }

    let mut ordered = Vec::with_capacity(6);
    for tier in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
        let mut tier_questions = by_tier.remove(&tier).unwrap_or_default();
        if tier_questions.len() < 2 {
            return Err(Error::UpstreamGeneration(format!(
                "difficulty distribution not satisfied: {:?} has {}",
                tier,
                tier_questions.len()
            )));
        }
        ordered.extend(tier_questions.drain(..2));
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn static_set_satisfies_layout() {
        let ai = GeminiService::new(
            None,
            "http://unused".into(),
            "test".into(),
            reqwest::Client::new(),
            std::time::Duration::from_secs(1),
        );
        let set = QuestionService::new(ai).static_set();
        assert_eq!(set.len(), 6);
        let tiers: Vec<Difficulty> = set.iter().map(|q| q.difficulty).collect();
        assert_eq!(tiers, Difficulty::session_layout());
        assert!(set.iter().all(|q| q.options.is_empty()));
        // Ids are unique within the set.
        let mut ids: Vec<&String> = set.iter().map(|q| &q.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn normalize_prefers_options_array() {
        let item = json!({
            "options": [" a ", "b", "", "c", "d"],
            "choices": ["ignored"],
        });
        assert_eq!(normalize_options(&item), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn normalize_accepts_alternate_field_names() {
        let item = json!({ "choices": ["x", "y"] });
        assert_eq!(normalize_options(&item), vec!["x", "y"]);
        let item = json!({ "answers": ["p", "q"] });
        assert_eq!(normalize_options(&item), vec!["p", "q"]);
    }

    #[test]
    fn normalize_splits_delimited_string() {
        let item = json!({ "options": "red; green | blue, yellow" });
        assert_eq!(
            normalize_options(&item),
            vec!["red", "green", "blue", "yellow"]
        );
    }

    #[test]
    fn normalize_extracts_from_question_text() {
        let item = json!({
            "text": "Which database did they use? Options: (A) Postgres, B. Redis, (C) Kafka, D) SQLite"
        });
        assert_eq!(
            normalize_options(&item),
            vec!["Postgres", "Redis", "Kafka", "SQLite"]
        );
    }

    #[test]
    fn normalize_terminal_case_is_empty() {
        let item = json!({ "text": "No options anywhere" });
        assert!(normalize_options(&item).is_empty());
    }

    #[test]
    fn coerce_rejects_missing_text_and_bad_difficulty() {
        assert!(coerce_question(&json!({ "difficulty": "Easy" })).is_err());
        assert!(coerce_question(&json!({ "text": "q", "difficulty": "Extreme" })).is_err());
    }

    #[test]
    fn coerce_derives_time_limit_and_bounds_index() {
        let q = coerce_question(&json!({
            "text": "q",
            "difficulty": "Hard",
            "options": ["a", "b", "c", "d"],
            "correctIndex": 3
        }))
        .unwrap();
        assert_eq!(q.time_limit, 120);
        assert_eq!(q.correct_index, Some(3));

        let q = coerce_question(&json!({
            "text": "q",
            "difficulty": "Easy",
            "options": ["a", "b", "c", "d"],
            "correctIndex": 9
        }))
        .unwrap();
        assert_eq!(q.correct_index, None);
    }

    #[test]
    fn ordering_requires_two_per_tier() {
        let make = |d: Difficulty| Question {
            id: uuid::Uuid::new_v4().to_string(),
            text: "q".into(),
            difficulty: d,
            time_limit: d.default_time_limit(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: Some(0),
            keywords: vec![],
        };

        let balanced = vec![
            make(Difficulty::Hard),
            make(Difficulty::Easy),
            make(Difficulty::Medium),
            make(Difficulty::Easy),
            make(Difficulty::Hard),
            make(Difficulty::Medium),
        ];
        let ordered = order_by_difficulty(balanced).unwrap();
        let tiers: Vec<Difficulty> = ordered.iter().map(|q| q.difficulty).collect();
        assert_eq!(tiers, Difficulty::session_layout());

        let skewed = vec![
            make(Difficulty::Easy),
            make(Difficulty::Easy),
            make(Difficulty::Easy),
            make(Difficulty::Medium),
            make(Difficulty::Medium),
            make(Difficulty::Hard),
        ];
        assert!(order_by_difficulty(skewed).is_err());
    }
}
