use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Contact details pulled out of raw resume text. Any field may come back
/// empty; the candidate can correct them before the interview starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
}

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("valid regex")
    })
}

fn phone_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\+?\d[\d\s-]{7,}\d").expect("valid regex"))
}

/// First email and phone match win; the name heuristic is the first
/// non-empty line of the document.
pub fn extract_contact_fields(text: &str) -> ContactFields {
    let email = email_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let phone = phone_pattern()
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let name = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();

    ContactFields { name, email, phone }
}
