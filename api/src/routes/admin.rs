//! Admin Endpoints
//!
//! 모든 핸들러는 `AdminUser` extractor로 관리자만 접근 가능.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    auth::AdminUser,
    db::{CourseProgressRow, Payment, ReviewFilter, SubmissionOverview},
    error::ApiError,
    render,
    services::{
        commerce,
        progress::{self, ReviewOutcome},
        reports::{self, AdminDashboard, AttendanceSheet, EnrollmentChange},
    },
    types::{Page, PageQuery},
    AppState,
};

// ============ Request Types ============

/// 프로젝트 목록 쿼리 (`?status=pending&search=kim&page=1&per_page=20`)
#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    #[serde(default)]
    pub status: ReviewFilter,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl ProjectListQuery {
    fn page(&self) -> PageQuery {
        let default = PageQuery::default();
        PageQuery {
            page: self.page.unwrap_or(default.page),
            per_page: self.per_page.unwrap_or(default.per_page),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub is_passed: bool,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceQuery {
    /// `YYYY-MM-DD,YYYY-MM-DD`
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentAction {
    #[default]
    Enroll,
    Unenroll,
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentRequest {
    pub user_id: i64,
    pub course_id: i64,
    #[serde(default)]
    pub action: EnrollmentAction,
}

// ============ Handlers ============

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<AdminDashboard>, ApiError> {
    Ok(Json(reports::admin_dashboard(state.repo.as_ref(), Utc::now()).await?))
}

/// GET /admin/projects
pub async fn list_projects(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Page<SubmissionOverview>>, ApiError> {
    let page = query.page();
    let projects = reports::list_projects(state.repo.as_ref(), query.status, query.search, page).await?;
    Ok(Json(projects))
}

/// POST /admin/projects/:id/review
pub async fn review_project(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(submission_id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let outcome = progress::review_project(
        state.repo.as_ref(),
        &admin,
        submission_id,
        req.is_passed,
        &req.feedback,
        Utc::now(),
    )
    .await?;
    Ok(Json(outcome))
}

/// GET /admin/courses/progress
pub async fn course_progress(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<CourseProgressRow>>, ApiError> {
    Ok(Json(reports::course_progress(state.repo.as_ref(), Utc::now()).await?))
}

/// GET /admin/courses/:id/attendance
pub async fn attendance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(course_id): Path<i64>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Json<AttendanceSheet>, ApiError> {
    let sheet = reports::attendance_sheet(
        state.repo.as_ref(),
        course_id,
        query.period.as_deref(),
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Json(sheet))
}

/// GET /admin/courses/:id/attendance/document
///
/// 인쇄용 출석부 HTML
pub async fn attendance_document(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(course_id): Path<i64>,
    Query(query): Query<AttendanceQuery>,
) -> Result<Html<String>, ApiError> {
    let sheet = reports::attendance_sheet(
        state.repo.as_ref(),
        course_id,
        query.period.as_deref(),
        Utc::now().date_naive(),
    )
    .await?;
    Ok(Html(render::attendance_document(&sheet).into_string()))
}

/// POST /admin/payments/:id/refund
pub async fn refund_payment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(payment_id): Path<i64>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<Payment>, ApiError> {
    let payment = commerce::refund_payment(
        state.repo.as_ref(),
        state.gateway.as_ref(),
        &admin,
        payment_id,
        &req.reason,
        Utc::now(),
    )
    .await?;
    Ok(Json(payment))
}

/// POST /admin/enrollments
///
/// ```json
/// { "user_id": 3, "course_id": 1, "action": "enroll" }
/// ```
pub async fn manage_enrollment(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(req): Json<EnrollmentRequest>,
) -> Result<Json<EnrollmentChange>, ApiError> {
    let change = match req.action {
        EnrollmentAction::Enroll => {
            reports::admin_enroll(state.repo.as_ref(), &admin, req.user_id, req.course_id).await?
        }
        EnrollmentAction::Unenroll => {
            reports::admin_unenroll(state.repo.as_ref(), &admin, req.user_id, req.course_id).await?
        }
    };
    Ok(Json(change))
}
