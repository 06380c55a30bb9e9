//! Database Models
//!
//! Row types for the catalog, learning records, certificates and commerce
//! tables. Enum columns are stored as lowercase TEXT and decoded through
//! the core crate's `TryFrom<String>` impls.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use skillbridge_core::mission::Answers;
use skillbridge_core::{Difficulty, EnrollmentStatus, LectureType, PaymentStatus, SubjectType};
use sqlx::types::Json;
use sqlx::FromRow;

// ============ Catalog ============

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// 수료증 / 출석부 표시 이름
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub short_description: String,
    #[sqlx(try_from = "String")]
    pub difficulty_level: Difficulty,
    /// 예상 학습 시간 (시간)
    pub estimated_time: i32,
    /// 이수 학점
    pub credit: i32,
    /// 가격 (원)
    pub price: i64,
    pub instructor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    #[sqlx(try_from = "String")]
    pub subject_type: SubjectType,
}

/// 강의 (소속 과정 id는 subjects 조인)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Lecture {
    pub id: i64,
    pub subject_id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub order_index: i32,
    #[sqlx(try_from = "String")]
    pub lecture_type: LectureType,
    pub video_url: Option<String>,
    /// 재생 시간 (초)
    pub duration: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MissionQuestion {
    pub id: i64,
    pub lecture_id: i64,
    pub question_text: String,
    pub option1: String,
    pub option2: String,
    pub option3: String,
    pub option4: String,
    pub option5: String,
    /// 정답 (1~5). 수강생에게 직렬화하지 않음
    #[serde(skip_serializing)]
    pub correct_answer: i32,
    pub order_index: i32,
}

impl MissionQuestion {
    pub fn options(&self) -> [&str; 5] {
        [
            &self.option1,
            &self.option2,
            &self.option3,
            &self.option4,
            &self.option5,
        ]
    }
}

// ============ Learning ============

/// 수강 등록 (과정명 / 사용자명은 조인)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub username: String,
    #[sqlx(try_from = "String")]
    pub status: EnrollmentStatus,
    pub progress_percentage: i32,
    pub certificate_number: Option<String>,
    pub certificate_issued_at: Option<DateTime<Utc>>,
    pub enrolled_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LectureProgress {
    pub id: i64,
    pub user_id: i64,
    pub lecture_id: i64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MissionAttempt {
    pub id: i64,
    pub user_id: i64,
    pub lecture_id: i64,
    pub score: i32,
    pub is_passed: bool,
    /// question_id → 선택 번호
    pub user_answers: Json<Answers>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectSubmission {
    pub id: i64,
    pub user_id: i64,
    pub subject_id: i64,
    /// MEDIA_ROOT 기준 상대 경로
    pub file_path: String,
    pub is_passed: bool,
    pub feedback: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Certificate {
    pub id: i64,
    pub user_id: i64,
    pub enrollment_id: i64,
    pub certificate_number: String,
    pub issued_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub document_html: Option<String>,
}

/// 수료증 발급 결과
#[derive(Debug, Clone)]
pub enum CertificateInsert {
    Issued(Certificate),
    /// 번호 충돌 (재생성 필요)
    NumberTaken,
    /// 이미 해당 수강에 수료증 존재
    AlreadyIssued,
}

// ============ Commerce ============

/// 장바구니 항목 (과정 정보 조인)
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub item_id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub title: String,
    pub price: i64,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: i64,
    pub user_id: Option<i64>,
    pub course_id: i64,
    pub course_title: String,
    pub amount: i64,
    pub payment_method: Option<String>,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    pub merchant_uid: String,
    pub imp_uid: Option<String>,
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 결제 검증 통과 후 기록할 주문
#[derive(Debug, Clone)]
pub struct CompletedOrder<'a> {
    pub user_id: i64,
    pub merchant_uid: &'a str,
    pub imp_uid: &'a str,
    pub payment_method: Option<&'a str>,
    pub lines: &'a [CartLine],
}

// ============ Reports ============

#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct DashboardTotals {
    pub total_students: i64,
    pub total_courses: i64,
    pub total_enrollments: i64,
    pub total_certificates: i64,
    pub completed_lecture_views: i64,
    pub total_sales: i64,
    pub today_sales: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseEnrollmentCount {
    pub course_id: i64,
    pub title: String,
    pub enrollment_count: i64,
}

/// 관리자 프로젝트 목록 행
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SubmissionOverview {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub subject_id: i64,
    pub subject_title: String,
    pub course_id: i64,
    pub course_title: String,
    pub file_path: String,
    pub is_passed: bool,
    pub feedback: String,
    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// 과정별 진행 현황
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseProgressRow {
    pub course_id: i64,
    pub title: String,
    pub student_count: i64,
    pub average_progress: f64,
    pub certificate_count: i64,
    pub recent_certificates: i64,
}

/// 출석부 집계 원천 행: 사용자별 일자별 완료 강의 수
#[derive(Debug, Clone, FromRow)]
pub struct DailyActivity {
    pub user_id: i64,
    pub day: NaiveDate,
    pub completed: i64,
}
