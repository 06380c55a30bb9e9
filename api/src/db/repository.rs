//! Repository Pattern Implementation
//!
//! 데이터 접근 계약을 trait으로 분리한다.
//!
//! - PostgreSQL 구현: `Database` (db/catalog.rs, learning.rs, commerce.rs, reports.rs)
//! - 테스트용 Mock: `mock::MemoryRepository`
//!
//! 서비스 레이어는 `&dyn Repository`만 의존하므로 DB 없이 테스트 가능.
//! 여러 행을 바꾸는 상태 전이(수료증 발급, 결제 완료, 환불)는 구현체가
//! 하나의 트랜잭션으로 처리해야 한다.

use async_trait::async_trait;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use skillbridge_core::mission::Answers;
use skillbridge_core::LearnerRecord;

use super::models::*;

/// 카탈로그 조회 (과정 / 과목 / 강의 / 문제)
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn list_courses(&self) -> Result<Vec<Course>>;
    async fn find_course(&self, id: i64) -> Result<Option<Course>>;
    async fn find_subject(&self, id: i64) -> Result<Option<Subject>>;
    /// order_index 순
    async fn list_subjects(&self, course_id: i64) -> Result<Vec<Subject>>;
    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>>;
    /// 과목 order_index, 강의 order_index 순
    async fn list_lectures(&self, course_id: i64) -> Result<Vec<Lecture>>;
    /// order_index 순
    async fn list_questions(&self, lecture_id: i64) -> Result<Vec<MissionQuestion>>;
}

/// 수강 등록
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find_enrollment(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>>;
    async fn find_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>>;
    /// 최근 등록 순
    async fn list_user_enrollments(&self, user_id: i64) -> Result<Vec<Enrollment>>;
    /// 사용자명 순
    async fn list_course_enrollments(&self, course_id: i64) -> Result<Vec<Enrollment>>;
    /// get-or-create. 새로 만들었으면 true
    async fn enroll(&self, user_id: i64, course_id: i64) -> Result<(Enrollment, bool)>;
    async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn set_progress(&self, enrollment_id: i64, percentage: i32, at: DateTime<Utc>)
        -> Result<()>;
    /// status = 'enrolled'인 경우에만 completed로 전이. 전이했으면 true
    async fn mark_completed(&self, enrollment_id: i64, at: DateTime<Utc>) -> Result<bool>;
}

/// 학습 기록 (강의 진도, 미션 응시, 프로젝트 제출)
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// 수료 판정 / 이어서 학습하기용 학습 기록 스냅샷
    async fn learner_record(&self, user_id: i64, course_id: i64) -> Result<LearnerRecord>;
    async fn find_lecture_progress(&self, user_id: i64, lecture_id: i64)
        -> Result<Option<LectureProgress>>;
    /// get-or-create 후 완료 처리. 이번 호출로 완료되었으면 true
    async fn complete_lecture(&self, user_id: i64, lecture_id: i64, at: DateTime<Utc>)
        -> Result<bool>;
    async fn count_completed_lectures(&self, user_id: i64, course_id: i64) -> Result<i64>;

    async fn find_attempt(&self, id: i64) -> Result<Option<MissionAttempt>>;
    async fn find_passed_attempt(&self, user_id: i64, lecture_id: i64)
        -> Result<Option<MissionAttempt>>;
    /// 가장 최근의 미통과 응시
    async fn find_open_attempt(&self, user_id: i64, lecture_id: i64)
        -> Result<Option<MissionAttempt>>;
    async fn start_attempt(&self, user_id: i64, lecture_id: i64, at: DateTime<Utc>)
        -> Result<MissionAttempt>;
    async fn grade_attempt(
        &self,
        attempt_id: i64,
        answers: &Answers,
        score: i32,
        is_passed: bool,
        at: DateTime<Utc>,
    ) -> Result<MissionAttempt>;

    async fn create_submission(
        &self,
        user_id: i64,
        subject_id: i64,
        file_path: &str,
        at: DateTime<Utc>,
    ) -> Result<ProjectSubmission>;
    async fn find_submission(&self, id: i64) -> Result<Option<ProjectSubmission>>;
    async fn review_submission(
        &self,
        id: i64,
        is_passed: bool,
        feedback: &str,
        reviewer_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<ProjectSubmission>>;
}

/// 수료증
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_certificate(&self, id: i64) -> Result<Option<Certificate>>;
    async fn find_certificate_for_enrollment(&self, enrollment_id: i64)
        -> Result<Option<Certificate>>;
    /// 최근 발급 순
    async fn list_user_certificates(&self, user_id: i64) -> Result<Vec<Certificate>>;
    /// 한 트랜잭션: 수료증 insert + enrollment certified 전이 + 번호/발급일 복사
    async fn insert_certificate(
        &self,
        enrollment_id: i64,
        user_id: i64,
        number: &str,
        at: DateTime<Utc>,
    ) -> Result<CertificateInsert>;
    async fn store_certificate_document(&self, id: i64, html: &str) -> Result<()>;
}

/// 장바구니 / 결제
#[async_trait]
pub trait CommerceRepository: Send + Sync {
    /// 담은 순
    async fn cart_lines(&self, user_id: i64) -> Result<Vec<CartLine>>;
    async fn find_cart_line(&self, item_id: i64) -> Result<Option<CartLine>>;
    /// 이미 담겨 있으면 false
    async fn add_cart_item(&self, user_id: i64, course_id: i64) -> Result<bool>;
    async fn remove_cart_item(&self, item_id: i64) -> Result<bool>;
    async fn clear_cart(&self, user_id: i64) -> Result<u64>;

    /// 한 트랜잭션: 과정별 completed 결제 기록 + 수강 등록(get-or-create) + 장바구니 비우기
    async fn record_completed_order(&self, order: &CompletedOrder<'_>) -> Result<Vec<Payment>>;
    async fn find_payment(&self, id: i64) -> Result<Option<Payment>>;
    /// 최근 결제 순
    async fn list_user_payments(&self, user_id: i64) -> Result<Vec<Payment>>;
    async fn payments_by_merchant_uid(&self, merchant_uid: &str) -> Result<Vec<Payment>>;
    /// 한 트랜잭션: refunded 전이 + 사유 기록 + 수강 삭제.
    /// completed 상태가 아니면 (없거나 이미 환불됨) None
    async fn refund_payment(&self, payment_id: i64, reason: &str, at: DateTime<Utc>)
        -> Result<Option<Payment>>;
}

/// 프로젝트 목록 상태 필터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    /// 미평가 (is_passed = false, reviewed_at IS NULL)
    #[default]
    Pending,
    /// 평가 완료
    Reviewed,
    Passed,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub status: ReviewFilter,
    /// 사용자명 / 과목명 / 과정명 부분 일치 (대소문자 무시)
    pub search: Option<String>,
}

impl SubmissionFilter {
    pub fn matches(&self, row: &SubmissionOverview) -> bool {
        let status_ok = match self.status {
            ReviewFilter::Pending => !row.is_passed && row.reviewed_at.is_none(),
            ReviewFilter::Reviewed => row.reviewed_at.is_some(),
            ReviewFilter::Passed => row.is_passed,
            ReviewFilter::All => true,
        };
        let search_ok = match self.search.as_deref() {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                [&row.username, &row.subject_title, &row.course_title]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&q))
            }
        };
        status_ok && search_ok
    }
}

/// 관리자 리포트 집계
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn dashboard_totals(&self, today_start: DateTime<Utc>) -> Result<DashboardTotals>;
    /// 수강생 많은 순
    async fn top_courses(&self, limit: i64) -> Result<Vec<CourseEnrollmentCount>>;
    /// 최근 제출 순 + 전체 개수
    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SubmissionOverview>, i64)>;
    async fn course_progress(&self, recent_since: DateTime<Utc>) -> Result<Vec<CourseProgressRow>>;
    /// [from, until) 구간의 사용자별 일자별 강의 완료 수
    async fn daily_activity(
        &self,
        course_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DailyActivity>>;
}

/// 서비스 레이어가 의존하는 전체 저장소
#[async_trait]
pub trait Repository:
    CatalogRepository
    + EnrollmentRepository
    + ProgressRepository
    + CertificateRepository
    + CommerceRepository
    + ReportRepository
{
    async fn health_check(&self) -> Result<()>;
}

// 테스트용 Mock 구현:
