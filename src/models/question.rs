use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn default_time_limit(self) -> u32 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 60,
            Difficulty::Hard => 120,
        }
    }

    pub fn score_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.2,
            Difficulty::Hard => 1.5,
        }
    }

    /// The required tier layout of every question set, in display order.
    pub fn session_layout() -> [Difficulty; 6] {
        [
            Difficulty::Easy,
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Hard,
        ]
    }
}

/// A single interview question. `options` is either empty (free-text
/// question) or exactly four choices; `correct_index` is only meaningful
/// when `options` is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub difficulty: Difficulty,
    pub time_limit: u32,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_index: Option<usize>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Question {
    pub fn free_text(text: &str, difficulty: Difficulty, keywords: &[&str]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.to_string(),
            difficulty,
            time_limit: difficulty.default_time_limit(),
            options: Vec::new(),
            correct_index: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        !self.options.is_empty()
    }

    /// Gradable questions are the only ones eligible for binary
    /// correctness scoring.
    pub fn is_gradable(&self) -> bool {
        self.is_multiple_choice() && self.correct_index.is_some()
    }
}
