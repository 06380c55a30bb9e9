//! Admin reporting: dashboard totals, project review queue, course progress
//! overview, attendance sheets and manual enrollment management.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use skillbridge_core::attendance::{daily_counts, period_options, AttendanceWindow, PeriodOption};
use skillbridge_core::EnrollmentStatus;

use crate::auth::AuthUser;
use crate::db::{
    CourseEnrollmentCount, CourseProgressRow, DashboardTotals, Enrollment, Repository,
    ReviewFilter, SubmissionFilter, SubmissionOverview,
};
use crate::error::ApiError;
use crate::types::{Page, PageQuery};

/// 대시보드 상위 과정 / 최근 미평가 프로젝트 개수
const DASHBOARD_LIST_SIZE: i64 = 10;

/// "최근 발급" 수료증 집계 기간
const RECENT_CERTIFICATE_DAYS: i64 = 7;

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

// ============ Dashboard ============

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    #[serde(flatten)]
    pub totals: DashboardTotals,
    pub top_courses: Vec<CourseEnrollmentCount>,
    pub pending_projects: Vec<SubmissionOverview>,
}

pub async fn admin_dashboard(repo: &dyn Repository, now: DateTime<Utc>) -> Result<AdminDashboard, ApiError> {
    let totals = repo.dashboard_totals(start_of_day(now.date_naive())).await?;
    let top_courses = repo.top_courses(DASHBOARD_LIST_SIZE).await?;
    let (pending_projects, _) = repo
        .list_submissions(&SubmissionFilter::default(), DASHBOARD_LIST_SIZE, 0)
        .await?;

    Ok(AdminDashboard {
        totals,
        top_courses,
        pending_projects,
    })
}

// ============ Projects ============

pub async fn list_projects(
    repo: &dyn Repository,
    status: ReviewFilter,
    search: Option<String>,
    page: PageQuery,
) -> Result<Page<SubmissionOverview>, ApiError> {
    let page = page.normalized();
    let filter = SubmissionFilter {
        status,
        search: search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
    };

    let (items, total) = repo
        .list_submissions(&filter, page.limit(), page.offset())
        .await?;
    Ok(Page::new(items, page, total))
}

// ============ Course progress ============

pub async fn course_progress(
    repo: &dyn Repository,
    now: DateTime<Utc>,
) -> Result<Vec<CourseProgressRow>, ApiError> {
    let recent_since = now - Duration::days(RECENT_CERTIFICATE_DAYS);
    Ok(repo.course_progress(recent_since).await?)
}

// ============ Attendance ============

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRow {
    pub user_id: i64,
    pub username: String,
    pub progress_percentage: i32,
    pub status: EnrollmentStatus,
    /// 기간 내 일자별 완료 강의 수
    pub daily_counts: Vec<i64>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSheet {
    pub course_id: i64,
    pub course_title: String,
    pub window: AttendanceWindow,
    pub days: Vec<NaiveDate>,
    pub rows: Vec<AttendanceRow>,
    /// 선택 가능한 2주 기간
    pub periods: Vec<PeriodOption>,
}

/// 출석부
///
/// `period`가 없거나 형식이 잘못되면 이번 주 월요일부터의 2주.
pub async fn attendance_sheet(
    repo: &dyn Repository,
    course_id: i64,
    period: Option<&str>,
    today: NaiveDate,
) -> Result<AttendanceSheet, ApiError> {
    let course = repo
        .find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {}", course_id)))?;

    let window = AttendanceWindow::resolve(today, period);
    let enrollments = repo.list_course_enrollments(course_id).await?;
    let activity = repo
        .daily_activity(
            course_id,
            start_of_day(window.start),
            start_of_day(window.end + Duration::days(1)),
        )
        .await?;

    let user_ids: Vec<i64> = enrollments.iter().map(|e| e.user_id).collect();
    let activity: Vec<(i64, NaiveDate, i64)> = activity
        .into_iter()
        .map(|a| (a.user_id, a.day, a.completed))
        .collect();
    let mut grid = daily_counts(&window, &user_ids, &activity);

    let rows = enrollments
        .into_iter()
        .map(|e| {
            let counts = grid.remove(&e.user_id).unwrap_or_default();
            AttendanceRow {
                user_id: e.user_id,
                username: e.username,
                progress_percentage: e.progress_percentage,
                status: e.status,
                total: counts.iter().sum(),
                daily_counts: counts,
            }
        })
        .collect();

    Ok(AttendanceSheet {
        course_id,
        course_title: course.title,
        days: window.days(),
        window,
        rows,
        periods: period_options(today),
    })
}

// ============ Manual enrollment ============

#[derive(Debug, Serialize)]
pub struct EnrollmentChange {
    pub enrollment: Option<Enrollment>,
    /// 실제로 생성 / 삭제되었는지
    pub changed: bool,
}

/// 수동 수강 등록 (이미 있으면 그대로)
pub async fn admin_enroll(
    repo: &dyn Repository,
    admin: &AuthUser,
    user_id: i64,
    course_id: i64,
) -> Result<EnrollmentChange, ApiError> {
    repo.find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {}", user_id)))?;
    repo.find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {}", course_id)))?;

    let (enrollment, created) = repo.enroll(user_id, course_id).await?;
    if created {
        tracing::info!(admin_id = admin.user_id, user_id, course_id, "Manual enrollment created");
    }

    Ok(EnrollmentChange {
        enrollment: Some(enrollment),
        changed: created,
    })
}

/// 수동 수강 취소
pub async fn admin_unenroll(
    repo: &dyn Repository,
    admin: &AuthUser,
    user_id: i64,
    course_id: i64,
) -> Result<EnrollmentChange, ApiError> {
    if !repo.unenroll(user_id, course_id).await? {
        return Err(ApiError::NotFound(format!(
            "Enrollment for user {} in course {}",
            user_id, course_id
        )));
    }

    tracing::info!(admin_id = admin.user_id, user_id, course_id, "Enrollment removed");
    Ok(EnrollmentChange {
        enrollment: None,
        changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CertificateRepository, EnrollmentRepository, ProgressRepository};
    use chrono::TimeZone;
    use skillbridge_core::{LectureType, SubjectType};

    fn admin() -> AuthUser {
        AuthUser { user_id: 1, username: "admin".into(), is_admin: true }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_attendance_counts_per_day() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let kim = repo.add_user("kim", false);
        let lee = repo.add_user("lee", false);
        let course = repo.add_course("Rust 입문", 50_000);
        let subject = repo.add_subject(course, 1, SubjectType::Normal);
        let l1 = repo.add_lecture(subject, 1, LectureType::Video);
        let l2 = repo.add_lecture(subject, 2, LectureType::Video);
        let l3 = repo.add_lecture(subject, 3, LectureType::Video);
        repo.enroll(kim, course).await.unwrap();
        repo.enroll(lee, course).await.unwrap();

        // 2025-03-05 (수) 기준 기간: 03-03 ~ 03-16
        let wed = Utc.with_ymd_and_hms(2025, 3, 5, 10, 0, 0).unwrap();
        repo.complete_lecture(kim, l1, wed).await.unwrap();
        repo.complete_lecture(kim, l2, wed + Duration::hours(2)).await.unwrap();
        // 기간 밖
        repo.complete_lecture(kim, l3, Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap())
            .await
            .unwrap();

        let sheet = attendance_sheet(&repo, course, None, d(2025, 3, 5)).await.unwrap();
        assert_eq!(sheet.window.start, d(2025, 3, 3));
        assert_eq!(sheet.days.len(), 14);
        assert_eq!(sheet.periods.len(), 13);

        let kim_row = sheet.rows.iter().find(|r| r.user_id == kim).unwrap();
        assert_eq!(kim_row.daily_counts[2], 2);
        assert_eq!(kim_row.total, 2);
        let lee_row = sheet.rows.iter().find(|r| r.user_id == lee).unwrap();
        assert!(lee_row.daily_counts.iter().all(|c| *c == 0));
    }

    #[tokio::test]
    async fn test_attendance_period_selection() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let course = repo.add_course("Rust 입문", 50_000);

        let sheet = attendance_sheet(&repo, course, Some("2025-02-17,2025-03-02"), d(2025, 3, 5))
            .await
            .unwrap();
        assert_eq!(sheet.window.start, d(2025, 2, 17));
        assert_eq!(sheet.window.end, d(2025, 3, 2));

        // 잘못된 형식은 이번 기간으로
        let fallback = attendance_sheet(&repo, course, Some("garbage"), d(2025, 3, 5)).await.unwrap();
        assert_eq!(fallback.window.start, d(2025, 3, 3));
    }

    #[tokio::test]
    async fn test_project_queue_filters() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let kim = repo.add_user("kim", false);
        let lee = repo.add_user("lee", false);
        let course = repo.add_course("Rust 입문", 50_000);
        let final_subject = repo.add_subject(course, 1, SubjectType::Final);
        let now = Utc::now();

        let a = repo.create_submission(kim, final_subject, "a.zip", now).await.unwrap();
        repo.create_submission(lee, final_subject, "b.zip", now + Duration::minutes(1)).await.unwrap();
        repo.review_submission(a.id, true, "good", 1, now).await.unwrap();

        let pending = list_projects(&repo, ReviewFilter::Pending, None, PageQuery::default()).await.unwrap();
        assert_eq!(pending.pagination.total, 1);
        assert_eq!(pending.items[0].username, "lee");

        let all = list_projects(&repo, ReviewFilter::All, Some(" KIM ".into()), PageQuery::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 1);
        assert!(all.items[0].is_passed);
    }

    #[tokio::test]
    async fn test_dashboard_totals() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let kim = repo.add_user("kim", false);
        let rust = repo.add_course("Rust 입문", 50_000);
        let go = repo.add_course("Go 입문", 30_000);
        let final_subject = repo.add_subject(rust, 1, SubjectType::Final);
        repo.enroll(kim, rust).await.unwrap();
        repo.create_submission(kim, final_subject, "a.zip", Utc::now()).await.unwrap();

        let dashboard = admin_dashboard(&repo, Utc::now()).await.unwrap();
        assert_eq!(dashboard.totals.total_students, 1);
        assert_eq!(dashboard.totals.total_courses, 2);
        assert_eq!(dashboard.top_courses[0].course_id, rust);
        assert_eq!(dashboard.top_courses[1].course_id, go);
        assert_eq!(dashboard.pending_projects.len(), 1);
    }

    #[tokio::test]
    async fn test_course_progress_recent_certificates() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let kim = repo.add_user("kim", false);
        let course = repo.add_course("Rust 입문", 50_000);
        let (enrollment, _) = repo.enroll(kim, course).await.unwrap();
        let now = Utc::now();
        repo.insert_certificate(enrollment.id, kim, "SB-20250301-00000001", now - Duration::days(10))
            .await
            .unwrap();

        let rows = course_progress(&repo, now).await.unwrap();
        assert_eq!(rows[0].certificate_count, 1);
        assert_eq!(rows[0].recent_certificates, 0);
    }

    #[tokio::test]
    async fn test_manual_enrollment() {
        let repo = crate::db::repository::mock::MemoryRepository::new();
        let kim = repo.add_user("kim", false);
        let course = repo.add_course("Rust 입문", 50_000);

        let first = admin_enroll(&repo, &admin(), kim, course).await.unwrap();
        assert!(first.changed);
        let again = admin_enroll(&repo, &admin(), kim, course).await.unwrap();
        assert!(!again.changed);

        assert!(admin_unenroll(&repo, &admin(), kim, course).await.unwrap().changed);
        assert!(matches!(
            admin_unenroll(&repo, &admin(), kim, course).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            admin_enroll(&repo, &admin(), 999, course).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
