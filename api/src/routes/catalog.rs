//! Course catalog endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::AuthUser,
    db::Course,
    error::ApiError,
    services::catalog::{self, CourseDetail},
    AppState,
};

/// GET /courses
///
/// 최신 등록 순
pub async fn list_courses(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.repo.list_courses().await?))
}

/// GET /courses/:id
///
/// 과목 / 강의 목차 포함
pub async fn get_course(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDetail>, ApiError> {
    let detail = catalog::course_detail(state.repo.as_ref(), course_id).await?;
    Ok(Json(detail))
}
