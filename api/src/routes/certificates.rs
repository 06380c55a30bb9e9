//! Certificate endpoints

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::Utc;

use crate::{
    auth::AuthUser, db::Certificate, error::ApiError, services::certificates, AppState,
};

/// POST /learning/enrollments/:id/certificate
///
/// 이미 발급되었으면 기존 수료증 반환
pub async fn issue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(enrollment_id): Path<i64>,
) -> Result<Json<Certificate>, ApiError> {
    let certificate =
        certificates::issue_certificate(state.repo.as_ref(), &user, enrollment_id, Utc::now()).await?;
    Ok(Json(certificate))
}

/// GET /certificates/:id
pub async fn view(
    State(state): State<AppState>,
    user: AuthUser,
    Path(certificate_id): Path<i64>,
) -> Result<Json<Certificate>, ApiError> {
    Ok(Json(certificates::view_certificate(state.repo.as_ref(), &user, certificate_id).await?))
}

/// GET /certificates/:id/document
///
/// 인쇄용 HTML
pub async fn document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(certificate_id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let html = certificates::certificate_document(state.repo.as_ref(), &user, certificate_id).await?;
    Ok(Html(html))
}
