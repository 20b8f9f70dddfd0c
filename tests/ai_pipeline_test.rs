//! Exercises the Gemini-backed paths against a mock endpoint: question
//! generation with option normalization and regeneration, rubric scoring,
//! and the deterministic fallback when the upstream misbehaves.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use interview_backend::models::question::{Difficulty, Question};
use interview_backend::models::session::{CandidateProfile, SessionStatus};
use interview_backend::services::ai_service::GeminiService;
use interview_backend::services::question_service::QuestionService;
use interview_backend::services::session_service::SessionService;
use interview_backend::storage::memory::MemoryStorage;

const GENERATE_PATH: &str = "/v1beta/models/test-model:generateContent";

fn gemini(base_url: String) -> GeminiService {
    GeminiService::new(
        Some("test-key".to_string()),
        base_url,
        "test-model".to_string(),
        reqwest::Client::new(),
        Duration::from_secs(5),
    )
}

/// Wraps a model reply the way the Gemini API does.
fn gemini_reply(text: &str) -> JsonValue {
    json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    })
}

fn question_item(difficulty: &str, correct: usize) -> JsonValue {
    json!({
        "text": format!("A {} question about the resume stack?", difficulty),
        "difficulty": difficulty,
        "keywords": ["axum", "postgres"],
        "options": ["one", "two", "three", "four"],
        "correctIndex": correct
    })
}

fn free_text_set() -> Vec<Question> {
    vec![
        Question::free_text("One", Difficulty::Easy, &["cache"]),
        Question::free_text("Two", Difficulty::Easy, &[]),
        Question::free_text("Three", Difficulty::Medium, &[]),
        Question::free_text("Four", Difficulty::Medium, &[]),
        Question::free_text("Five", Difficulty::Hard, &[]),
        Question::free_text("Six", Difficulty::Hard, &[]),
    ]
}

#[tokio::test]
async fn resume_grounded_generation_happy_path() {
    let server = MockServer::start().await;
    let items: Vec<JsonValue> = ["Hard", "Easy", "Medium", "Easy", "Hard", "Medium"]
        .iter()
        .map(|d| question_item(d, 2))
        .collect();
    let payload = format!("```json\n{}\n```", JsonValue::Array(items));

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&payload)))
        .mount(&server)
        .await;

    let svc = QuestionService::new(gemini(server.uri()));
    let questions = svc.generate_from_resume("Rust, axum, Postgres").await.unwrap();

    assert_eq!(questions.len(), 6);
    let tiers: Vec<Difficulty> = questions.iter().map(|q| q.difficulty).collect();
    assert_eq!(tiers, Difficulty::session_layout());
    for q in &questions {
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.correct_index, Some(2));
        assert_eq!(q.time_limit, q.difficulty.default_time_limit());
    }
}

#[tokio::test]
async fn malformed_options_trigger_one_shot_regeneration() {
    let server = MockServer::start().await;

    let mut items: Vec<JsonValue> = ["Easy", "Easy", "Medium", "Medium", "Hard"]
        .iter()
        .map(|d| question_item(d, 0))
        .collect();
    // Final item carries a delimited string with only three usable options.
    items.push(json!({
        "text": "Which tool did the candidate use for migrations?",
        "difficulty": "Hard",
        "keywords": [],
        "options": "sqlx; diesel; refinery",
        "correctIndex": 1
    }));

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(&JsonValue::Array(items).to_string())),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    // The second request is the per-question option regeneration.
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "[\"sqlx\", \"diesel\", \"refinery\", \"flyway\"]",
        )))
        .mount(&server)
        .await;

    let svc = QuestionService::new(gemini(server.uri()));
    let questions = svc.generate_from_resume("Rust resume").await.unwrap();
    let last = questions.last().unwrap();
    assert_eq!(last.options, vec!["sqlx", "diesel", "refinery", "flyway"]);
}

#[tokio::test]
async fn bad_distribution_fails_generation_outright() {
    let server = MockServer::start().await;
    let items: Vec<JsonValue> = (0..6).map(|_| question_item("Easy", 0)).collect();

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(&JsonValue::Array(items).to_string())),
        )
        .mount(&server)
        .await;

    let svc = QuestionService::new(gemini(server.uri()));
    let err = svc.generate_from_resume("Rust resume").await.unwrap_err();
    assert!(err.to_string().contains("distribution"));
}

#[tokio::test]
async fn short_reply_fails_generation_outright() {
    let server = MockServer::start().await;
    let items: Vec<JsonValue> = (0..3).map(|_| question_item("Easy", 0)).collect();

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(&JsonValue::Array(items).to_string())),
        )
        .mount(&server)
        .await;

    let svc = QuestionService::new(gemini(server.uri()));
    assert!(svc.generate_from_resume("Rust resume").await.is_err());
}

#[tokio::test]
async fn llm_rubric_score_is_stored_on_the_answer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("expert technical interviewer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"score": 88, "feedback": "Solid depth.", "keywords": ["cache"], "strengths": [], "improvements": []}"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Score 0-100 and summarize"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"overallScore": 88, "summary": "Consistently strong answers."}"#,
        )))
        .mount(&server)
        .await;

    let svc = SessionService::new(Arc::new(MemoryStorage::new()), gemini(server.uri()));
    let session = svc
        .create(CandidateProfile::default(), free_text_set())
        .await
        .unwrap();

    for question in &session.questions {
        svc.submit_answer(&session.id, &question.id, "Layered caching.", 3, None)
            .await
            .unwrap();
    }

    let done = svc.get(&session.id).await.unwrap();
    assert_eq!(done.status, SessionStatus::Finished);
    for answer in done.answers.values() {
        assert_eq!(answer.score, Some(88));
        assert_eq!(answer.feedback.as_deref(), Some("Solid depth."));
    }
    // Mean of the stored per-answer scores.
    assert_eq!(done.final_score, Some(88));
    assert_eq!(done.summary.as_deref(), Some("Consistently strong answers."));
}

#[tokio::test]
async fn upstream_failure_falls_back_to_deterministic_scoring() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let svc = SessionService::new(Arc::new(MemoryStorage::new()), gemini(server.uri()));
    let session = svc
        .create(
            CandidateProfile {
                name: "Dana".into(),
                email: "dana@example.com".into(),
                phone: None,
            },
            free_text_set(),
        )
        .await
        .unwrap();

    // Every submission succeeds even though the LLM errors on each call.
    for question in &session.questions {
        svc.submit_answer(
            &session.id,
            &question.id,
            "A cache layer in front of the database keeps hot reads fast.",
            4,
            None,
        )
        .await
        .unwrap();
    }

    let done = svc.get(&session.id).await.unwrap();
    assert_eq!(done.status, SessionStatus::Finished);
    for answer in done.answers.values() {
        let score = answer.score.unwrap();
        assert!(score <= 100);
        assert!(answer.feedback.is_some());
    }
    // The summary degraded to the templated bucket, never an error.
    let summary = done.summary.unwrap();
    assert!(
        ["Excellent performance.", "Good performance.", "Needs improvement."]
            .contains(&summary.as_str())
    );

    let candidate = svc.finish(&session.id).await.unwrap();
    assert_eq!(candidate.name, "Dana");
    assert_eq!(candidate.score, done.final_score.unwrap());
}

#[tokio::test]
async fn unparsable_summary_reply_uses_templated_bucket() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("expert technical interviewer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            r#"{"score": 95, "feedback": "Great.", "keywords": [], "strengths": [], "improvements": []}"#,
        )))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_string_contains("Score 0-100 and summarize"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(gemini_reply("sorry, no JSON today")),
        )
        .mount(&server)
        .await;

    let svc = SessionService::new(Arc::new(MemoryStorage::new()), gemini(server.uri()));
    let session = svc
        .create(CandidateProfile::default(), free_text_set())
        .await
        .unwrap();
    for question in &session.questions {
        svc.submit_answer(&session.id, &question.id, "Answer.", 2, None)
            .await
            .unwrap();
    }

    let done = svc.get(&session.id).await.unwrap();
    assert_eq!(done.final_score, Some(95));
    assert_eq!(done.summary.as_deref(), Some("Excellent performance."));
}

#[tokio::test]
async fn generate_options_parses_and_bounds_the_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(
            "Here are your options: [\"a\", \"b\", \"c\", \"d\", \"e\"]",
        )))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let ai = gemini(server.uri());
    let options = ai.generate_options("What is ownership?").await.unwrap();
    assert_eq!(options, vec!["a", "b", "c", "d"]);

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("[\"a\", \"b\"]")))
        .mount(&server)
        .await;
    assert!(ai.generate_options("What is borrowing?").await.is_err());
}
