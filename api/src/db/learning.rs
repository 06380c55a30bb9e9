//! Learning records: enrollments, lecture progress, mission attempts,
//! project submissions and certificates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skillbridge_core::mission::Answers;
use skillbridge_core::LearnerRecord;
use sqlx::types::Json;

use super::models::{
    Certificate, CertificateInsert, Enrollment, LectureProgress, MissionAttempt,
    ProjectSubmission,
};
use super::repository::{CertificateRepository, EnrollmentRepository, ProgressRepository};
use super::Database;

const ENROLLMENT_SELECT: &str = r#"
    SELECT
        e.id,
        e.user_id,
        e.course_id,
        c.title AS course_title,
        u.username,
        e.status,
        e.progress_percentage,
        e.certificate_number,
        e.certificate_issued_at,
        e.enrolled_at,
        e.last_activity_at,
        e.completed_at
    FROM enrollments e
    JOIN courses c ON c.id = e.course_id
    JOIN users u ON u.id = e.user_id
"#;

const ATTEMPT_COLUMNS: &str =
    "id, user_id, lecture_id, score, is_passed, user_answers, started_at, completed_at";

const SUBMISSION_COLUMNS: &str =
    "id, user_id, subject_id, file_path, is_passed, feedback, submitted_at, reviewed_at, reviewed_by";

const CERTIFICATE_COLUMNS: &str =
    "id, user_id, enrollment_id, certificate_number, issued_at, document_html";

/// 수료증 번호 unique 제약 (migrations 참고)
const CERTIFICATE_NUMBER_KEY: &str = "certificates_number_key";
const CERTIFICATE_ENROLLMENT_KEY: &str = "certificates_enrollment_key";

// ============ Enrollments ============

#[async_trait]
impl EnrollmentRepository for Database {
    async fn find_enrollment(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>> {
        let enrollment = sqlx::query_as::<_, Enrollment>(&format!(
            "{} WHERE e.user_id = $1 AND e.course_id = $2",
            ENROLLMENT_SELECT
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(enrollment)
    }

    async fn find_enrollment_by_id(&self, id: i64) -> Result<Option<Enrollment>> {
        let enrollment =
            sqlx::query_as::<_, Enrollment>(&format!("{} WHERE e.id = $1", ENROLLMENT_SELECT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(enrollment)
    }

    async fn list_user_enrollments(&self, user_id: i64) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, Enrollment>(&format!(
            "{} WHERE e.user_id = $1 ORDER BY e.enrolled_at DESC, e.id DESC",
            ENROLLMENT_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_course_enrollments(&self, course_id: i64) -> Result<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, Enrollment>(&format!(
            "{} WHERE e.course_id = $1 ORDER BY u.username",
            ENROLLMENT_SELECT
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn enroll(&self, user_id: i64, course_id: i64) -> Result<(Enrollment, bool)> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO enrollments (user_id, course_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, course_id) DO NOTHING
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .execute(&self.pool)
        .await?
        .rows_affected()
            == 1;

        let enrollment = self
            .find_enrollment(user_id, course_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("enrollment ({}, {}) vanished", user_id, course_id))?;

        Ok((enrollment, inserted))
    }

    async fn unenroll(&self, user_id: i64, course_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE user_id = $1 AND course_id = $2")
            .bind(user_id)
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_progress(&self, enrollment_id: i64, percentage: i32, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE enrollments
            SET progress_percentage = $2, last_activity_at = $3
            WHERE id = $1
            "#
        )
        .bind(enrollment_id)
        .bind(percentage)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_completed(&self, enrollment_id: i64, at: DateTime<Utc>) -> Result<bool> {
        // 조건부 전이: 동시에 여러 트리거가 와도 한 번만 성공
        let result = sqlx::query(
            r#"
            UPDATE enrollments
            SET status = 'completed', completed_at = $2
            WHERE id = $1 AND status = 'enrolled'
            "#
        )
        .bind(enrollment_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

// ============ Progress / Missions / Projects ============

#[async_trait]
impl ProgressRepository for Database {
    async fn learner_record(&self, user_id: i64, course_id: i64) -> Result<LearnerRecord> {
        let completed_lectures: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT lp.lecture_id
            FROM lecture_progress lp
            JOIN lectures l ON l.id = lp.lecture_id
            JOIN subjects s ON s.id = l.subject_id
            WHERE lp.user_id = $1 AND s.course_id = $2 AND lp.is_completed
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let passed_missions: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT ma.lecture_id
            FROM mission_attempts ma
            JOIN lectures l ON l.id = ma.lecture_id
            JOIN subjects s ON s.id = l.subject_id
            WHERE ma.user_id = $1 AND s.course_id = $2 AND ma.is_passed
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let passed_projects: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT ps.subject_id
            FROM project_submissions ps
            JOIN subjects s ON s.id = ps.subject_id
            WHERE ps.user_id = $1 AND s.course_id = $2 AND ps.is_passed
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(LearnerRecord {
            completed_lectures: completed_lectures.into_iter().collect(),
            passed_missions: passed_missions.into_iter().collect(),
            passed_projects: passed_projects.into_iter().collect(),
        })
    }

    async fn find_lecture_progress(&self, user_id: i64, lecture_id: i64) -> Result<Option<LectureProgress>> {
        let progress = sqlx::query_as::<_, LectureProgress>(
            r#"
            SELECT id, user_id, lecture_id, is_completed, completed_at, created_at, updated_at
            FROM lecture_progress
            WHERE user_id = $1 AND lecture_id = $2
            "#
        )
        .bind(user_id)
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(progress)
    }

    async fn complete_lecture(&self, user_id: i64, lecture_id: i64, at: DateTime<Utc>) -> Result<bool> {
        // 이미 완료된 행은 건드리지 않음 (completed_at 보존)
        let result = sqlx::query(
            r#"
            INSERT INTO lecture_progress (
                user_id, lecture_id, is_completed, completed_at, created_at, updated_at
            )
            VALUES ($1, $2, TRUE, $3, $3, $3)
            ON CONFLICT (user_id, lecture_id)
            DO UPDATE SET
                is_completed = TRUE,
                completed_at = EXCLUDED.completed_at,
                updated_at = EXCLUDED.updated_at
            WHERE lecture_progress.is_completed = FALSE
            "#
        )
        .bind(user_id)
        .bind(lecture_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_completed_lectures(&self, user_id: i64, course_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM lecture_progress lp
            JOIN lectures l ON l.id = lp.lecture_id
            JOIN subjects s ON s.id = l.subject_id
            WHERE lp.user_id = $1 AND s.course_id = $2 AND lp.is_completed
            "#
        )
        .bind(user_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn find_attempt(&self, id: i64) -> Result<Option<MissionAttempt>> {
        let attempt = sqlx::query_as::<_, MissionAttempt>(&format!(
            "SELECT {} FROM mission_attempts WHERE id = $1",
            ATTEMPT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn find_passed_attempt(&self, user_id: i64, lecture_id: i64) -> Result<Option<MissionAttempt>> {
        let attempt = sqlx::query_as::<_, MissionAttempt>(&format!(
            r#"
            SELECT {} FROM mission_attempts
            WHERE user_id = $1 AND lecture_id = $2 AND is_passed
            ORDER BY id DESC
            LIMIT 1
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn find_open_attempt(&self, user_id: i64, lecture_id: i64) -> Result<Option<MissionAttempt>> {
        let attempt = sqlx::query_as::<_, MissionAttempt>(&format!(
            r#"
            SELECT {} FROM mission_attempts
            WHERE user_id = $1 AND lecture_id = $2 AND NOT is_passed
            ORDER BY id DESC
            LIMIT 1
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(lecture_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn start_attempt(&self, user_id: i64, lecture_id: i64, at: DateTime<Utc>) -> Result<MissionAttempt> {
        let attempt = sqlx::query_as::<_, MissionAttempt>(&format!(
            r#"
            INSERT INTO mission_attempts (user_id, lecture_id, started_at)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(user_id)
        .bind(lecture_id)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn grade_attempt(
        &self,
        attempt_id: i64,
        answers: &Answers,
        score: i32,
        is_passed: bool,
        at: DateTime<Utc>,
    ) -> Result<MissionAttempt> {
        let attempt = sqlx::query_as::<_, MissionAttempt>(&format!(
            r#"
            UPDATE mission_attempts
            SET user_answers = $2, score = $3, is_passed = $4, completed_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            ATTEMPT_COLUMNS
        ))
        .bind(attempt_id)
        .bind(Json(answers))
        .bind(score)
        .bind(is_passed)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn create_submission(
        &self,
        user_id: i64,
        subject_id: i64,
        file_path: &str,
        at: DateTime<Utc>,
    ) -> Result<ProjectSubmission> {
        let submission = sqlx::query_as::<_, ProjectSubmission>(&format!(
            r#"
            INSERT INTO project_submissions (user_id, subject_id, file_path, submitted_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(user_id)
        .bind(subject_id)
        .bind(file_path)
        .bind(at)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn find_submission(&self, id: i64) -> Result<Option<ProjectSubmission>> {
        let submission = sqlx::query_as::<_, ProjectSubmission>(&format!(
            "SELECT {} FROM project_submissions WHERE id = $1",
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }

    async fn review_submission(
        &self,
        id: i64,
        is_passed: bool,
        feedback: &str,
        reviewer_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<ProjectSubmission>> {
        let submission = sqlx::query_as::<_, ProjectSubmission>(&format!(
            r#"
            UPDATE project_submissions
            SET is_passed = $2, feedback = $3, reviewed_by = $4, reviewed_at = $5
            WHERE id = $1
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        ))
        .bind(id)
        .bind(is_passed)
        .bind(feedback)
        .bind(reviewer_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(submission)
    }
}

// ============ Certificates ============

#[async_trait]
impl CertificateRepository for Database {
    async fn find_certificate(&self, id: i64) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates WHERE id = $1",
            CERTIFICATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    async fn find_certificate_for_enrollment(&self, enrollment_id: i64) -> Result<Option<Certificate>> {
        let certificate = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates WHERE enrollment_id = $1",
            CERTIFICATE_COLUMNS
        ))
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(certificate)
    }

    async fn list_user_certificates(&self, user_id: i64) -> Result<Vec<Certificate>> {
        let rows = sqlx::query_as::<_, Certificate>(&format!(
            "SELECT {} FROM certificates WHERE user_id = $1 ORDER BY issued_at DESC",
            CERTIFICATE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_certificate(
        &self,
        enrollment_id: i64,
        user_id: i64,
        number: &str,
        at: DateTime<Utc>,
    ) -> Result<CertificateInsert> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Certificate>(&format!(
            r#"
            INSERT INTO certificates (user_id, enrollment_id, certificate_number, issued_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CERTIFICATE_COLUMNS
        ))
        .bind(user_id)
        .bind(enrollment_id)
        .bind(number)
        .bind(at)
        .fetch_one(&mut *tx)
        .await;

        let certificate = match inserted {
            Ok(certificate) => certificate,
            Err(sqlx::Error::Database(db_err)) => {
                let constraint = db_err.constraint().map(str::to_owned);
                let outcome = match constraint.as_deref() {
                    Some(CERTIFICATE_NUMBER_KEY) => CertificateInsert::NumberTaken,
                    Some(CERTIFICATE_ENROLLMENT_KEY) => CertificateInsert::AlreadyIssued,
                    _ => return Err(sqlx::Error::Database(db_err).into()),
                };
                tx.rollback().await?;
                return Ok(outcome);
            }
            Err(e) => return Err(e.into()),
        };

        // 수강 상태 certified 전이 + 번호 / 발급일 복사
        sqlx::query(
            r#"
            UPDATE enrollments
            SET status = 'certified', certificate_number = $2, certificate_issued_at = $3
            WHERE id = $1
            "#
        )
        .bind(enrollment_id)
        .bind(&certificate.certificate_number)
        .bind(certificate.issued_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CertificateInsert::Issued(certificate))
    }

    async fn store_certificate_document(&self, id: i64, html: &str) -> Result<()> {
        sqlx::query("UPDATE certificates SET document_html = $2 WHERE id = $1")
            .bind(id)
            .bind(html)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
