//! Error types for SkillBridge learning rules
//!
//! Provides structured error handling for parsing and validating domain values.

use thiserror::Error;

/// Error types for rule evaluation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A stored or submitted status string is not a known variant
    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },

    /// Mission answers must pick one of the five options
    #[error("answer {answer} for question {question_id} is outside 1..=5")]
    AnswerOutOfRange { question_id: i64, answer: i32 },

    /// Attendance period could not be parsed
    #[error("invalid attendance period: {0}")]
    InvalidPeriod(String),

    /// A transition was requested from a state that does not allow it
    #[error("cannot move enrollment from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

/// Result type for rule evaluation
pub type CoreResult<T> = Result<T, CoreError>;

/// Input validation utilities
pub mod validation {
    use super::*;

    /// Lowest option number on a mission question
    pub const MIN_OPTION: i32 = 1;

    /// Highest option number on a mission question
    pub const MAX_OPTION: i32 = 5;

    /// Validate that a mission answer picks one of the five options
    pub fn validate_option(question_id: i64, answer: i32) -> CoreResult<()> {
        if !(MIN_OPTION..=MAX_OPTION).contains(&answer) {
            return Err(CoreError::AnswerOutOfRange {
                question_id,
                answer,
            });
        }
        Ok(())
    }
}
