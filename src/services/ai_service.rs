use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::session::Session;

/// Per-answer assessment returned by the generation service for free-text
/// answers. Any parse or transport failure is the caller's cue to use the
/// deterministic fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerAssessment {
    pub score: u8,
    pub feedback: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

/// The synthesis reply also carries an `overallScore` field; the final
/// score is always computed deterministically from the answers, so only
/// the summary text is consumed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionVerdict {
    pub summary: String,
}

#[derive(Clone)]
pub struct GeminiService {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiService {
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        client: Client,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url,
            model,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single attempt with a bounded timeout; no retries. Callers decide
    /// whether a failure is fatal or triggers the deterministic path.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::BadRequest("AI key missing. Set GOOGLE_API_KEY.".to_string()))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let res = self
            .client
            .post(&url)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::UpstreamGeneration(format!(
                "Gemini API error {}: {}",
                status, text
            )));
        }

        let body: JsonValue = res.json().await?;
        body.get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| {
                Error::UpstreamGeneration("Invalid Gemini response format".to_string())
            })
    }

    /// Requests six resume-grounded multiple-choice questions. Returns the
    /// raw items; shape validation and option normalization happen in the
    /// question provider.
    pub async fn generate_resume_questions(&self, resume_text: &str) -> Result<Vec<JsonValue>> {
        let context: String = resume_text.chars().take(4000).collect();
        let prompt = format!(
            "You are an expert interviewer. Create RESUME-SPECIFIC multiple-choice questions \
             strictly about topics the candidate has experience with.\n\
             Ground every question in this resume context (no generic definitions; reference \
             frameworks, libraries, tools, databases, cloud, patterns or accomplishments from \
             the resume):\n{context}\n\
             Return ONLY a JSON array of 6 items (no prose). Each item must be:\n\
             {{\"text\":\"...\",\"difficulty\":\"Easy|Medium|Hard\",\"keywords\":[\"resume terms\"],\
             \"options\":[\"...\",\"...\",\"...\",\"...\"],\"correct_index\":0|1|2|3}}\n\
             STRICT RULES:\n\
             - Exactly 6 items, exactly 4 concise options per item.\n\
             - Exactly 2 Easy, 2 Medium, 2 Hard.\n\
             - Question text <= 150 chars; options <= 80 chars.\n\
             - Options must be plausible; exactly one best answer (correct_index)."
        );

        let raw = self.generate(&prompt).await?;
        let chunk = extract_json_array(&raw)
            .ok_or_else(|| Error::UpstreamGeneration("no JSON array in response".to_string()))?;
        let items: Vec<JsonValue> = serde_json::from_str(chunk)
            .map_err(|e| Error::UpstreamGeneration(format!("unparsable question array: {}", e)))?;
        Ok(items)
    }

    /// One-shot option regeneration for a single question.
    pub async fn generate_options(&self, question_text: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Provide exactly 4 concise, mutually exclusive multiple-choice options for this \
             question. Return ONLY a JSON array of 4 strings, no prose. Question: {question_text}"
        );
        let raw = self.generate(&prompt).await?;
        let chunk = extract_json_array(&raw)
            .ok_or_else(|| Error::UpstreamGeneration("no JSON array in response".to_string()))?;
        let options: Vec<String> = serde_json::from_str(chunk)
            .map_err(|e| Error::UpstreamGeneration(format!("unparsable options: {}", e)))?;
        if options.len() < 4 {
            return Err(Error::UpstreamGeneration("insufficient options".to_string()));
        }
        Ok(options.into_iter().take(4).collect())
    }

    /// Scores one free-text answer against the fixed rubric.
    pub async fn assess_answer(
        &self,
        question: &Question,
        answer: &str,
        time_used: u32,
    ) -> Result<AnswerAssessment> {
        let prompt = format!(
            "You are an expert technical interviewer evaluating a candidate's answer.\n\n\
             Question: \"{}\"\nDifficulty: {:?}\nTime Limit: {} seconds\nTime Used: {} seconds\n\n\
             Candidate's Answer: \"{}\"\n\n\
             Score 0-100 based on technical accuracy and depth, relevance to the question, \
             clarity and structure, use of appropriate terminology, and time management.\n\
             Respond with ONLY this JSON object:\n\
             {{\"score\": <number 0-100>, \"feedback\": \"<detailed feedback>\", \
             \"keywords\": [\"...\"], \"strengths\": [\"...\"], \"improvements\": [\"...\"]}}",
            question.text, question.difficulty, question.time_limit, time_used, answer
        );

        let raw = self.generate(&prompt).await?;
        let chunk = extract_json_object(&raw)
            .ok_or_else(|| Error::UpstreamGeneration("no JSON object in response".to_string()))?;
        let mut assessment: AnswerAssessment = serde_json::from_str(chunk)
            .map_err(|e| Error::UpstreamGeneration(format!("unparsable assessment: {}", e)))?;
        assessment.score = assessment.score.min(100);
        Ok(assessment)
    }

    /// Natural-language synthesis over the whole session, grounded in every
    /// question/answer pair.
    pub async fn summarize_session(&self, session: &Session) -> Result<SessionVerdict> {
        let lines: Vec<String> = session
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let answer = session
                    .answer_for(&q.id)
                    .map(|a| a.text.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or("No answer");
                format!("Q{} ({:?}): {}\nA: {}", i + 1, q.difficulty, q.text, answer)
            })
            .collect();

        let prompt = format!(
            "You are an interviewer. Score 0-100 and summarize succinctly.\n{}\n\
             Return ONLY JSON {{\"overallScore\": <number 0-100>, \"summary\": \"<performance \
             summary>\"}}",
            lines.join("\n\n")
        );

        let raw = self.generate(&prompt).await?;
        let chunk = extract_json_object(&raw)
            .ok_or_else(|| Error::UpstreamGeneration("no JSON object in response".to_string()))?;
        let verdict: SessionVerdict = serde_json::from_str(chunk)
            .map_err(|e| Error::UpstreamGeneration(format!("unparsable verdict: {}", e)))?;
        if verdict.summary.trim().is_empty() {
            return Err(Error::UpstreamGeneration("empty summary".to_string()));
        }
        Ok(verdict)
    }
}

/// Locates the outermost JSON array in a model reply, tolerating markdown
/// code fences and surrounding prose.
pub fn extract_json_array(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
