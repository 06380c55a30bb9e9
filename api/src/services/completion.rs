//! Completion Evaluator
//!
//! 수강 상태를 `enrolled → completed`로 전이시키는 유일한 경로.
//!
//! 강의 완료, 미션 통과, 프로젝트 통과가 일어난 지점에서 `on_learning_event`를
//! 직접 호출한다. 판정 로직 자체는 `skillbridge_core::evaluate`이고, 여기서는
//! 저장소에서 과정 구조와 학습 기록을 모아 조건부 UPDATE를 건다.

use std::fmt;

use chrono::{DateTime, Utc};
use skillbridge_core::{evaluate, Completion, EnrollmentStatus};

use crate::db::{Enrollment, Repository};
use crate::services::catalog::course_outline;

/// 수료 판정을 유발한 학습 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearningEvent {
    LectureCompleted { lecture_id: i64 },
    MissionPassed { lecture_id: i64 },
    ProjectPassed { subject_id: i64 },
}

impl fmt::Display for LearningEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningEvent::LectureCompleted { lecture_id } => write!(f, "lecture {} completed", lecture_id),
            LearningEvent::MissionPassed { lecture_id } => write!(f, "mission {} passed", lecture_id),
            LearningEvent::ProjectPassed { subject_id } => write!(f, "project for subject {} passed", subject_id),
        }
    }
}

/// 수료 조건 확인
///
/// 이미 completed / certified면 아무것도 바꾸지 않고 true.
/// 모든 조건을 만족하면 completed로 전이 (completed_at = now) 후 true.
pub async fn check_completion(
    repo: &dyn Repository,
    enrollment: &Enrollment,
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    if enrollment.status.is_finished() {
        return Ok(true);
    }

    let outline = course_outline(repo, enrollment.course_id).await?;
    let record = repo
        .learner_record(enrollment.user_id, enrollment.course_id)
        .await?;

    match evaluate(&outline, &record) {
        Completion::Satisfied => {
            enrollment.status.transition_to(EnrollmentStatus::Completed)?;
            if repo.mark_completed(enrollment.id, now).await? {
                tracing::info!(
                    enrollment_id = enrollment.id,
                    user_id = enrollment.user_id,
                    course_id = enrollment.course_id,
                    "🎓 Course completed"
                );
            }
            Ok(true)
        }
        Completion::Unmet(requirement) => {
            tracing::debug!(
                enrollment_id = enrollment.id,
                ?requirement,
                "Completion requirement not met"
            );
            Ok(false)
        }
    }
}

/// 학습 이벤트 후 수료 판정 (best effort)
///
/// 수강 등록이 없으면 warn 로그만 남기고 건너뛴다. 판정 실패도 호출자의
/// 요청을 실패시키지 않는다.
pub async fn on_learning_event(
    repo: &dyn Repository,
    user_id: i64,
    course_id: i64,
    event: LearningEvent,
    now: DateTime<Utc>,
) -> bool {
    let enrollment = match repo.find_enrollment(user_id, course_id).await {
        Ok(Some(enrollment)) => enrollment,
        Ok(None) => {
            tracing::warn!(
                user_id,
                course_id,
                "Enrollment not found after {}; completion check skipped",
                event
            );
            return false;
        }
        Err(e) => {
            tracing::error!("Failed to load enrollment after {}: {:?}", event, e);
            return false;
        }
    };

    match check_completion(repo, &enrollment, now).await {
        Ok(finished) => finished,
        Err(e) => {
            tracing::error!(
                enrollment_id = enrollment.id,
                "Completion check after {} failed: {:?}",
                event,
                e
            );
            false
        }
    }
}
