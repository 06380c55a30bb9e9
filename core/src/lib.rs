//! SkillBridge Learning Rules
//!
//! Pure business rules for the SkillBridge learning platform. Nothing in this
//! crate touches the database or the network; the API crate loads snapshots,
//! hands them to these functions and persists the outcome.
//!
//! # Modules
//! - `status`: enrollment / subject / lecture / payment state enums
//! - `mission`: mission quiz scoring (pass threshold 80)
//! - `progress`: cached progress percentage
//! - `completion`: graduation requirement evaluation
//! - `navigation`: "resume learning" and previous/next lecture resolution
//! - `identifiers`: certificate numbers and order numbers
//! - `attendance`: two-week attendance windows for admin reports
//!
//! # Example
//! ```
//! use skillbridge_core::completion::{evaluate, Completion, CourseOutline, LearnerRecord};
//! use skillbridge_core::status::{LectureType, SubjectType};
//!
//! let mut outline = CourseOutline::default();
//! outline.push_subject(1, 1, SubjectType::Normal);
//! outline.push_lecture(1, 10, 1, LectureType::Video);
//!
//! let mut record = LearnerRecord::default();
//! assert!(matches!(evaluate(&outline, &record), Completion::Unmet(_)));
//!
//! record.completed_lectures.insert(10);
//! assert_eq!(evaluate(&outline, &record), Completion::Satisfied);
//! ```

pub mod attendance;
pub mod completion;
pub mod error;
pub mod identifiers;
pub mod mission;
pub mod navigation;
pub mod progress;
pub mod status;

#[cfg(test)]
mod tests;

// Rule exports
pub use completion::{evaluate, Completion, CourseOutline, LearnerRecord, Requirement};
pub use mission::{score_answers, MissionScore, PASS_THRESHOLD};
pub use navigation::{neighbours, next_learning_item, LectureNeighbours, NextItem};
pub use progress::progress_percentage;

// Error handling
pub use error::{CoreError, CoreResult};

// State enums
pub use status::{Difficulty, EnrollmentStatus, LectureType, PaymentStatus, SubjectType};
