//! Certificate Issuer
//!
//! 수료한 수강 1건당 수료증 1장. 발급은 한 트랜잭션(수료증 insert +
//! enrollment `certified` 전이)이고, 문서 렌더링은 발급 후 best effort로 수행한다.
//! 문서가 없는 수료증은 다운로드 시점에 다시 렌더링한다.

use chrono::{DateTime, Utc};
use skillbridge_core::identifiers::certificate_number;
use skillbridge_core::EnrollmentStatus;

use crate::auth::AuthUser;
use crate::db::{Certificate, CertificateInsert, Enrollment, Repository};
use crate::error::ApiError;
use crate::render;
use crate::services::completion::check_completion;

/// 번호 충돌 시 재생성 횟수
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// 수료증 발급
///
/// 이미 발급된 수료증이 있으면 그대로 돌려준다.
pub async fn issue_certificate(
    repo: &dyn Repository,
    user: &AuthUser,
    enrollment_id: i64,
    now: DateTime<Utc>,
) -> Result<Certificate, ApiError> {
    let enrollment = repo
        .find_enrollment_by_id(enrollment_id)
        .await?
        .filter(|e| e.user_id == user.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Enrollment {}", enrollment_id)))?;

    if let Some(existing) = repo.find_certificate_for_enrollment(enrollment.id).await? {
        tracing::debug!(enrollment_id, "Certificate already issued");
        return Ok(existing);
    }

    if !check_completion(repo, &enrollment, now).await? {
        return Err(ApiError::Conflict(
            "모든 과정을 완료해야 수료증을 발급받을 수 있습니다".to_string(),
        ));
    }

    // 이번 호출에서 completed로 전이되었을 수 있으므로 다시 읽음 (completed_at)
    let enrollment = repo
        .find_enrollment_by_id(enrollment.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Enrollment {}", enrollment_id)))?;
    enrollment.status.transition_to(EnrollmentStatus::Certified)?;

    let certificate = insert_with_fresh_number(repo, &enrollment, now).await?;

    tracing::info!(
        enrollment_id,
        user_id = user.user_id,
        "📜 Certificate issued: {}",
        certificate.certificate_number
    );

    if let Err(e) = store_document(repo, &certificate, &enrollment).await {
        tracing::warn!(
            certificate_id = certificate.id,
            "Certificate document rendering failed: {:?}",
            e
        );
    }

    Ok(certificate)
}

async fn insert_with_fresh_number(
    repo: &dyn Repository,
    enrollment: &Enrollment,
    now: DateTime<Utc>,
) -> Result<Certificate, ApiError> {
    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let number = certificate_number(now.date_naive());
        match repo
            .insert_certificate(enrollment.id, enrollment.user_id, &number, now)
            .await?
        {
            CertificateInsert::Issued(certificate) => return Ok(certificate),
            CertificateInsert::NumberTaken => {
                tracing::warn!(attempt, "Certificate number {} taken, regenerating", number);
            }
            CertificateInsert::AlreadyIssued => {
                // 동시 요청이 먼저 발급
                return repo
                    .find_certificate_for_enrollment(enrollment.id)
                    .await?
                    .ok_or_else(|| {
                        anyhow::anyhow!("certificate for enrollment {} vanished after conflict", enrollment.id)
                            .into()
                    });
            }
        }
    }

    Err(anyhow::anyhow!(
        "could not allocate a unique certificate number after {} attempts",
        MAX_NUMBER_ATTEMPTS
    )
    .into())
}

async fn render_document(
    repo: &dyn Repository,
    certificate: &Certificate,
    enrollment: &Enrollment,
) -> anyhow::Result<String> {
    let learner = repo
        .find_user(certificate.user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {} not found", certificate.user_id))?;
    let course = repo
        .find_course(enrollment.course_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("course {} not found", enrollment.course_id))?;

    Ok(render::certificate_document(certificate, &learner, &course, enrollment.completed_at).into_string())
}

async fn store_document(
    repo: &dyn Repository,
    certificate: &Certificate,
    enrollment: &Enrollment,
) -> anyhow::Result<String> {
    let html = render_document(repo, certificate, enrollment).await?;
    repo.store_certificate_document(certificate.id, &html).await?;
    Ok(html)
}

async fn load_visible(
    repo: &dyn Repository,
    user: &AuthUser,
    certificate_id: i64,
) -> Result<Certificate, ApiError> {
    let certificate = repo
        .find_certificate(certificate_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Certificate {}", certificate_id)))?;

    if !user.can_access(Some(certificate.user_id)) {
        return Err(ApiError::Forbidden("본인의 수료증만 조회할 수 있습니다".to_string()));
    }
    Ok(certificate)
}

/// 수료증 조회 (본인 또는 관리자)
pub async fn view_certificate(
    repo: &dyn Repository,
    user: &AuthUser,
    certificate_id: i64,
) -> Result<Certificate, ApiError> {
    load_visible(repo, user, certificate_id).await
}

/// 수료증 문서 (없으면 렌더링 후 저장)
pub async fn certificate_document(
    repo: &dyn Repository,
    user: &AuthUser,
    certificate_id: i64,
) -> Result<String, ApiError> {
    let certificate = load_visible(repo, user, certificate_id).await?;
    if let Some(html) = certificate.document_html.clone() {
        return Ok(html);
    }

    let enrollment = repo
        .find_enrollment_by_id(certificate.enrollment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Enrollment {}", certificate.enrollment_id)))?;

    tracing::info!(certificate_id, "Rendering missing certificate document");
    Ok(store_document(repo, &certificate, &enrollment).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::mock::MemoryRepository;
    use crate::db::{CertificateRepository, EnrollmentRepository, ProgressRepository};
    use skillbridge_core::identifiers::is_certificate_number;
    use skillbridge_core::{LectureType, SubjectType};

    struct Fixture {
        repo: MemoryRepository,
        user: AuthUser,
        enrollment: Enrollment,
        video: i64,
    }

    async fn fixture() -> Fixture {
        let repo = MemoryRepository::new();
        let user_id = repo.add_user("kim", false);
        let course = repo.add_course("Rust 입문", 50_000);
        let subject = repo.add_subject(course, 1, SubjectType::Normal);
        let video = repo.add_lecture(subject, 1, LectureType::Video);
        let (enrollment, _) = repo.enroll(user_id, course).await.unwrap();

        Fixture {
            repo,
            user: AuthUser { user_id, username: "kim".into(), is_admin: false },
            enrollment,
            video,
        }
    }

    async fn finished() -> Fixture {
        let f = fixture().await;
        f.repo.complete_lecture(f.user.user_id, f.video, Utc::now()).await.unwrap();
        f
    }

    #[tokio::test]
    async fn test_incomplete_course_rejected() {
        let f = fixture().await;
        let err = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        assert!(f.repo.list_user_certificates(f.user.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_issue_certifies_enrollment() {
        let f = finished().await;
        let now = Utc::now();
        let certificate = issue_certificate(&f.repo, &f.user, f.enrollment.id, now).await.unwrap();

        assert!(is_certificate_number(&certificate.certificate_number));
        let enrollment = f.repo.find_enrollment_by_id(f.enrollment.id).await.unwrap().unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Certified);
        assert_eq!(enrollment.certificate_number.as_deref(), Some(certificate.certificate_number.as_str()));
        assert_eq!(enrollment.certificate_issued_at, Some(now));

        // 발급 직후 문서 저장
        let stored = f.repo.find_certificate(certificate.id).await.unwrap().unwrap();
        assert!(stored.document_html.unwrap().contains(&certificate.certificate_number));
    }

    #[tokio::test]
    async fn test_document_carries_completion_date_set_while_issuing() {
        // 강의는 모두 끝났지만 아직 enrolled 상태: 발급 호출이 completed로 전이시킴
        let f = finished().await;
        let before = f.repo.find_enrollment_by_id(f.enrollment.id).await.unwrap().unwrap();
        assert_eq!(before.status, EnrollmentStatus::Enrolled);
        assert!(before.completed_at.is_none());

        let now = Utc::now();
        let certificate = issue_certificate(&f.repo, &f.user, f.enrollment.id, now).await.unwrap();

        let stored = f.repo.find_certificate(certificate.id).await.unwrap().unwrap();
        let html = stored.document_html.unwrap();
        assert!(html.contains("수료일"));
    }

    #[tokio::test]
    async fn test_issue_twice_returns_same_certificate() {
        let f = finished().await;
        let first = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now()).await.unwrap();
        let second = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now()).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(f.repo.list_user_certificates(f.user.user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_number_collision_retries() {
        let f = finished().await;
        f.repo.collide_certificate_numbers(MAX_NUMBER_ATTEMPTS - 1);
        assert!(issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now()).await.is_ok());
    }

    #[tokio::test]
    async fn test_number_collision_gives_up() {
        let f = finished().await;
        f.repo.collide_certificate_numbers(MAX_NUMBER_ATTEMPTS);
        let err = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InternalError));
        let enrollment = f.repo.find_enrollment_by_id(f.enrollment.id).await.unwrap().unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Completed);
    }

    #[tokio::test]
    async fn test_other_users_enrollment_not_found() {
        let f = finished().await;
        let other = AuthUser { user_id: 999, username: "lee".into(), is_admin: false };
        assert!(matches!(
            issue_certificate(&f.repo, &other, f.enrollment.id, Utc::now()).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_document_access() {
        let f = finished().await;
        let certificate = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now()).await.unwrap();

        let other = AuthUser { user_id: 999, username: "lee".into(), is_admin: false };
        assert!(matches!(
            certificate_document(&f.repo, &other, certificate.id).await,
            Err(ApiError::Forbidden(_))
        ));

        let admin = AuthUser { user_id: 1_000, username: "admin".into(), is_admin: true };
        let html = certificate_document(&f.repo, &admin, certificate.id).await.unwrap();
        assert!(html.contains("수 료 증"));
    }

    #[tokio::test]
    async fn test_missing_document_rendered_on_demand() {
        let f = finished().await;
        let certificate = issue_certificate(&f.repo, &f.user, f.enrollment.id, Utc::now()).await.unwrap();
        f.repo.clear_certificate_document(certificate.id);

        let html = certificate_document(&f.repo, &f.user, certificate.id).await.unwrap();
        assert!(html.contains(&certificate.certificate_number));
        let stored = f.repo.find_certificate(certificate.id).await.unwrap().unwrap();
        assert_eq!(stored.document_html.as_deref(), Some(html.as_str()));
    }
}
