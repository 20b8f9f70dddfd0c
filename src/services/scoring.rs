//! Deterministic scoring: binary correctness for multiple-choice answers,
//! the rule-based fallback formula for free-text answers, and the final
//! aggregate. Always available; the LLM path layers on top of this.

use crate::models::question::Question;
use crate::models::session::Session;

/// Binary correctness for a choice submission. Undefined (None) unless the
/// question is multiple-choice and an option was actually selected;
/// undefined is not the same as incorrect.
pub fn choice_correctness(question: &Question, selected_index: Option<usize>) -> Option<bool> {
    match (question.is_multiple_choice(), question.correct_index, selected_index) {
        (true, Some(correct), Some(selected)) => Some(selected == correct),
        _ => None,
    }
}

/// Rule-based score for a free-text answer, in [0, 100].
///
/// Three components: an answer-length tier (10/20/30/40 for
/// <50/<100/<200/longer chars) scaled by the difficulty multiplier and
/// capped at 70, a time bonus by used/limit ratio (+20/+15/+10/+5, -10 when
/// over the limit), and +5 per matched keyword capped at 30.
pub fn fallback_score(question: &Question, answer: &str, time_used: u32) -> u8 {
    let trimmed = answer.trim();
    let length = trimmed.chars().count();

    let tier = if length < 50 {
        10.0
    } else if length < 100 {
        20.0
    } else if length < 200 {
        30.0
    } else {
        40.0
    };
    let base = (tier * question.difficulty.score_multiplier()).min(70.0);

    let ratio = if question.time_limit == 0 {
        0.0
    } else {
        time_used as f64 / question.time_limit as f64
    };
    let time_bonus = if ratio <= 0.3 {
        20.0
    } else if ratio <= 0.6 {
        15.0
    } else if ratio <= 0.8 {
        10.0
    } else if ratio <= 1.0 {
        5.0
    } else {
        -10.0
    };

    let lowered = trimmed.to_lowercase();
    let matched = question
        .keywords
        .iter()
        .filter(|k| lowered.contains(&k.to_lowercase()))
        .count();
    let keyword_score = ((matched * 5) as f64).min(30.0);

    (base + time_bonus + keyword_score).clamp(0.0, 100.0).round() as u8
}

/// Canned feedback attached to fallback-scored answers.
pub fn fallback_feedback(question: &Question, score: u8) -> String {
    let mut feedback = if score >= 85 {
        "Excellent answer! You demonstrated strong understanding and provided comprehensive \
         details."
    } else if score >= 70 {
        "Good answer! You covered the main points well with room for more detail."
    } else if score >= 50 {
        "Fair answer. Consider providing more specific examples and technical details."
    } else {
        "The answer needs improvement. Try to be more specific and provide concrete examples."
    }
    .to_string();

    if question.difficulty == crate::models::question::Difficulty::Hard && score < 70 {
        feedback.push_str(
            " For complex questions like this, consider breaking down your approach \
             step-by-step and discussing trade-offs.",
        );
    }
    feedback
}

/// Final 0-100 score for a session. Sessions with gradable questions score
/// as the fraction answered correctly; undefined correctness never counts
/// against the candidate. Sessions without any gradable question fall back
/// to the mean of per-answer free-text scores.
pub fn overall_score(session: &Session) -> u8 {
    let gradable: Vec<&Question> = session
        .questions
        .iter()
        .filter(|q| q.is_gradable())
        .collect();

    if !gradable.is_empty() {
        let correct = gradable
            .iter()
            .filter(|q| {
                session
                    .answer_for(&q.id)
                    .and_then(|a| a.is_correct)
                    .unwrap_or(false)
            })
            .count();
        return ((correct as f64 / gradable.len() as f64) * 100.0).round() as u8;
    }

    if session.questions.is_empty() {
        return 0;
    }

    let total: f64 = session
        .questions
        .iter()
        .map(|q| match session.answer_for(&q.id) {
            Some(answer) => answer
                .score
                .unwrap_or_else(|| fallback_score(q, &answer.text, answer.time_used))
                as f64,
            None => 0.0,
        })
        .sum();
    (total / session.questions.len() as f64).round() as u8
}

/// Templated one-liner used when no LLM synthesis is available.
pub fn bucket_summary(score: u8) -> &'static str {
    if score >= 80 {
        "Excellent performance."
    } else if score >= 60 {
        "Good performance."
    } else {
        "Needs improvement."
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Difficulty;
    use crate::models::session::{Answer, CandidateProfile};

    fn mcq(correct: usize) -> Question {
        Question {
            id: uuid::Uuid::new_v4().to_string(),
            text: "Pick one".into(),
            difficulty: Difficulty::Easy,
            time_limit: 20,
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: Some(correct),
            keywords: vec![],
        }
    }

    fn answer(question: &Question, selected: Option<usize>) -> Answer {
        Answer {
            question_id: question.id.clone(),
            text: String::new(),
            selected_index: selected,
            is_correct: choice_correctness(question, selected),
            time_used: 5,
            score: None,
            feedback: None,
        }
    }

    #[test]
    fn correctness_is_index_equality() {
        let q = mcq(2);
        assert_eq!(choice_correctness(&q, Some(2)), Some(true));
        assert_eq!(choice_correctness(&q, Some(0)), Some(false));
        assert_eq!(choice_correctness(&q, None), None);

        let free = Question::free_text("Explain", Difficulty::Medium, &[]);
        assert_eq!(choice_correctness(&free, Some(1)), None);
    }

    #[test]
    fn fallback_score_stays_in_bounds() {
        let q = Question::free_text("Explain", Difficulty::Easy, &["cache"]);
        // Empty answer, over the limit: tier 10 - 10 clamps to 0.
        assert_eq!(fallback_score(&q, "", 999), 0);
        // Long keyword-rich answer cannot exceed 100.
        let long = "cache ".repeat(100);
        assert!(fallback_score(&q, &long, 1) <= 100);
    }

    #[test]
    fn fallback_score_combines_length_time_and_keywords() {
        // 250-char answer at 20% of a 60s hard question, 2 of 3 keywords:
        // base min(70, 40*1.5)=60, time +20, keywords +10.
        let q = Question {
            id: "q".into(),
            text: "Design a queue".into(),
            difficulty: Difficulty::Hard,
            time_limit: 60,
            options: vec![],
            correct_index: None,
            keywords: vec!["broker".into(), "partition".into(), "offset".into()],
        };
        let answer = format!(
            "A broker cluster with partitioned logs. {}",
            "x".repeat(210)
        );
        assert!(answer.chars().count() >= 200);
        assert_eq!(fallback_score(&q, &answer, 12), 90);
    }

    #[test]
    fn mcq_session_scores_correct_over_gradable() {
        // 6 gradable questions, 4 answered correctly, 2 unanswered:
        // round(100 * 4/6) == 67, and the unanswered pair is not counted
        // as incorrect beyond the denominator it already occupies.
        let questions: Vec<Question> = (0..6).map(|_| mcq(1)).collect();
        let mut session = Session::new(CandidateProfile::default(), questions);
        for q in session.questions.clone().iter().take(4) {
            session
                .answers
                .insert(q.id.clone(), answer(q, Some(1)));
        }
        assert_eq!(overall_score(&session), 67);
    }

    #[test]
    fn undefined_correctness_excluded_from_denominator() {
        // One gradable question answered correctly plus one free-text
        // question: the free-text question is not gradable, so the MCQ
        // fraction is 1/1.
        let gradable = mcq(0);
        let free = Question::free_text("Explain", Difficulty::Easy, &[]);
        let mut session = Session::new(
            CandidateProfile::default(),
            vec![gradable.clone(), free.clone()],
        );
        session
            .answers
            .insert(gradable.id.clone(), answer(&gradable, Some(0)));
        assert_eq!(overall_score(&session), 100);
    }

    #[test]
    fn free_text_session_averages_stored_scores() {
        let q1 = Question::free_text("One", Difficulty::Easy, &[]);
        let q2 = Question::free_text("Two", Difficulty::Easy, &[]);
        let mut session =
            Session::new(CandidateProfile::default(), vec![q1.clone(), q2.clone()]);
        for (q, score) in [(&q1, 80u8), (&q2, 60u8)] {
            session.answers.insert(
                q.id.clone(),
                Answer {
                    question_id: q.id.clone(),
                    text: "answer".into(),
                    selected_index: None,
                    is_correct: None,
                    time_used: 5,
                    score: Some(score),
                    feedback: None,
                },
            );
        }
        assert_eq!(overall_score(&session), 70);
    }

    #[test]
    fn summary_buckets() {
        assert_eq!(bucket_summary(95), "Excellent performance.");
        assert_eq!(bucket_summary(80), "Excellent performance.");
        assert_eq!(bucket_summary(60), "Good performance.");
        assert_eq!(bucket_summary(59), "Needs improvement.");
    }
}
