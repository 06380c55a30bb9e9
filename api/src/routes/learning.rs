//! Learning Endpoints
//!
//! 수강생 학습 흐름: 대시보드, 이어서 학습하기, 동영상 강의, 미션, 프로젝트.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use skillbridge_core::mission::Answers;
use skillbridge_core::NextItem;

use crate::{
    auth::AuthUser,
    db::ProjectSubmission,
    error::ApiError,
    services::progress::{
        self, DashboardView, MissionResultView, MissionView, VideoLectureView,
    },
    AppState,
};

/// 프로젝트 업로드 필드 이름
pub const PROJECT_FILE_FIELD: &str = "project_file";

/// 프로젝트 파일 최대 크기 (50 MiB)
pub const MAX_PROJECT_FILE_BYTES: usize = 50 * 1024 * 1024;

// ============ Request Types ============

/// 미션 답안
///
/// ```json
/// { "answers": { "12": 3, "13": 1 } }
/// ```
#[derive(Debug, Deserialize)]
pub struct MissionSubmission {
    #[serde(default)]
    pub answers: Answers,
}

// ============ Handlers ============

/// GET /learning/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardView>, ApiError> {
    Ok(Json(progress::dashboard(state.repo.as_ref(), &user).await?))
}

/// GET /learning/courses/:id/resume
pub async fn resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<i64>,
) -> Result<Json<NextItem>, ApiError> {
    Ok(Json(progress::resume(state.repo.as_ref(), &user, course_id).await?))
}

/// GET /learning/lectures/:id/video
///
/// 첫 조회 시 강의 완료 처리 → 진도율 갱신 → 수료 판정
pub async fn video_lecture(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lecture_id): Path<i64>,
) -> Result<Json<VideoLectureView>, ApiError> {
    let view = progress::view_video_lecture(state.repo.as_ref(), &user, lecture_id, Utc::now()).await?;
    Ok(Json(view))
}

/// GET /learning/lectures/:id/mission
pub async fn mission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lecture_id): Path<i64>,
) -> Result<Json<MissionView>, ApiError> {
    Ok(Json(progress::mission_view(state.repo.as_ref(), &user, lecture_id).await?))
}

/// POST /learning/lectures/:id/mission
pub async fn submit_mission(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lecture_id): Path<i64>,
    Json(req): Json<MissionSubmission>,
) -> Result<Json<MissionResultView>, ApiError> {
    let result = progress::submit_mission(
        state.repo.as_ref(),
        &user,
        lecture_id,
        req.answers,
        Utc::now(),
    )
    .await?;
    Ok(Json(result))
}

/// GET /learning/attempts/:id
pub async fn mission_result(
    State(state): State<AppState>,
    user: AuthUser,
    Path(attempt_id): Path<i64>,
) -> Result<Json<MissionResultView>, ApiError> {
    Ok(Json(progress::mission_result(state.repo.as_ref(), &user, attempt_id).await?))
}

/// POST /learning/subjects/:id/project
///
/// multipart/form-data, 파일 필드 `project_file`
pub async fn submit_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(subject_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ProjectSubmission>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(PROJECT_FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {}", e)))?;
        upload = Some((filename, bytes.to_vec()));
    }

    let (filename, contents) = upload.ok_or_else(|| {
        ApiError::ValidationError(format!("{} is required", PROJECT_FILE_FIELD))
    })?;

    let submission = progress::submit_project(
        state.repo.as_ref(),
        &state.media,
        &user,
        subject_id,
        &filename,
        &contents,
        Utc::now(),
    )
    .await?;
    Ok(Json(submission))
}

/// GET /learning/projects/:id
pub async fn project_detail(
    State(state): State<AppState>,
    user: AuthUser,
    Path(submission_id): Path<i64>,
) -> Result<Json<ProjectSubmission>, ApiError> {
    Ok(Json(progress::project_detail(state.repo.as_ref(), &user, submission_id).await?))
}
