//! Mission Quiz Scoring
//!
//! A mission lecture owns an ordered set of five-option questions. A learner
//! submits a map of question id → chosen option; the score is the share of the
//! lecture's questions answered correctly, as a floored percentage.
//!
//! # Rules
//! - Denominator is the number of questions on the lecture, not the number of
//!   answers submitted (skipped questions count as wrong).
//! - Answers for question ids that do not belong to the lecture are ignored.
//! - Out-of-range options (outside 1..=5) never match.
//! - `is_passed = score >= 80`. The threshold is fixed.
//! - A mission without questions scores 0 and cannot be passed.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::validation::validate_option;

/// 통과 기준 점수 (%)
pub const PASS_THRESHOLD: i32 = 80;

/// Submitted answers: question id → chosen option (1..=5)
pub type Answers = BTreeMap<i64, i32>;

/// Answer key for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerKey {
    pub question_id: i64,
    pub correct_answer: i32,
}

/// 채점 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MissionScore {
    pub correct: usize,
    pub total: usize,
    pub score: i32,
    pub is_passed: bool,
}

/// Per-question outcome used by the mission result view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub question_id: i64,
    pub chosen: Option<i32>,
    pub is_correct: bool,
}

/// Score an attempt against the lecture's answer keys.
pub fn score_answers(keys: &[AnswerKey], answers: &Answers) -> MissionScore {
    let total = keys.len();
    let correct = keys
        .iter()
        .filter(|key| is_correct(key, answers.get(&key.question_id).copied()))
        .count();

    let score = if total == 0 {
        0
    } else {
        // floor(correct / total * 100)
        ((correct * 100) / total) as i32
    };

    MissionScore {
        correct,
        total,
        score,
        is_passed: total > 0 && score >= PASS_THRESHOLD,
    }
}

/// Question-by-question breakdown in lecture order.
pub fn outcomes(keys: &[AnswerKey], answers: &Answers) -> Vec<QuestionOutcome> {
    keys.iter()
        .map(|key| {
            let chosen = answers.get(&key.question_id).copied();
            QuestionOutcome {
                question_id: key.question_id,
                chosen,
                is_correct: is_correct(key, chosen),
            }
        })
        .collect()
}

fn is_correct(key: &AnswerKey, chosen: Option<i32>) -> bool {
    match chosen {
        Some(answer) => {
            validate_option(key.question_id, answer).is_ok() && answer == key.correct_answer
        }
        None => false,
    }
}
