//! Domain state enums
//!
//! Every enum is stored as lowercase text in the database and travels as the
//! same lowercase string in JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        /// sqlx `#[sqlx(try_from = "String")]` 컬럼 디코딩용
        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

text_enum!(
    /// 수강 상태: enrolled → completed → certified
    EnrollmentStatus, "enrollment status" {
        Enrolled => "enrolled",
        Completed => "completed",
        Certified => "certified",
    }
);

text_enum!(
    /// 과목 유형. midterm/final 과목은 강의 대신 프로젝트 제출로 평가
    SubjectType, "subject type" {
        Normal => "normal",
        Midterm => "midterm",
        Final => "final",
    }
);

text_enum!(
    /// 강의 유형
    LectureType, "lecture type" {
        Video => "video",
        Mission => "mission",
    }
);

text_enum!(
    /// 결제 상태
    PaymentStatus, "payment status" {
        Pending => "pending",
        Completed => "completed",
        Failed => "failed",
        Refunded => "refunded",
    }
);

text_enum!(
    /// 과정 난이도
    Difficulty, "difficulty level" {
        Beginner => "beginner",
        Basic => "basic",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
);

impl EnrollmentStatus {
    /// `completed` and `certified` both mean every requirement was met.
    pub fn is_finished(&self) -> bool {
        matches!(self, EnrollmentStatus::Completed | EnrollmentStatus::Certified)
    }

    /// Validate a forward transition of the state machine.
    ///
    /// Staying in the same state is allowed so repeated triggers stay harmless.
    pub fn transition_to(self, next: EnrollmentStatus) -> Result<EnrollmentStatus, CoreError> {
        use EnrollmentStatus::*;

        match (self, next) {
            (a, b) if a == b => Ok(b),
            (Enrolled, Completed) | (Completed, Certified) => Ok(next),
            (from, to) => Err(CoreError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

impl SubjectType {
    /// Midterm and final subjects are graded by project submission.
    pub fn is_exam(&self) -> bool {
        matches!(self, SubjectType::Midterm | SubjectType::Final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_text() {
        for status in EnrollmentStatus::ALL {
            assert_eq!(status.as_str().parse::<EnrollmentStatus>().unwrap(), *status);
        }
        assert_eq!("midterm".parse::<SubjectType>().unwrap(), SubjectType::Midterm);
        assert!("quiz".parse::<LectureType>().is_err());
    }

    #[test]
    fn test_try_from_string() {
        let status = PaymentStatus::try_from("refunded".to_string()).unwrap();
        assert_eq!(status, PaymentStatus::Refunded);
    }

    #[test]
    fn test_transitions() {
        use EnrollmentStatus::*;

        assert_eq!(Enrolled.transition_to(Completed), Ok(Completed));
        assert_eq!(Completed.transition_to(Certified), Ok(Certified));
        assert_eq!(Completed.transition_to(Completed), Ok(Completed));
        assert!(Enrolled.transition_to(Certified).is_err());
        assert!(Certified.transition_to(Enrolled).is_err());
    }

    #[test]
    fn test_is_finished() {
        assert!(!EnrollmentStatus::Enrolled.is_finished());
        assert!(EnrollmentStatus::Completed.is_finished());
        assert!(EnrollmentStatus::Certified.is_finished());
        assert!(SubjectType::Final.is_exam());
        assert!(!SubjectType::Normal.is_exam());
    }
}
