//! Admin aggregates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{
    CourseEnrollmentCount, CourseProgressRow, DailyActivity, DashboardTotals, SubmissionOverview,
};
use super::repository::{ReportRepository, ReviewFilter, SubmissionFilter};
use super::Database;

const SUBMISSION_FROM: &str = r#"
    FROM project_submissions ps
    JOIN users u ON u.id = ps.user_id
    JOIN subjects s ON s.id = ps.subject_id
    JOIN courses c ON c.id = s.course_id
"#;

fn status_clause(filter: ReviewFilter) -> &'static str {
    match filter {
        ReviewFilter::Pending => "NOT ps.is_passed AND ps.reviewed_at IS NULL",
        ReviewFilter::Reviewed => "ps.reviewed_at IS NOT NULL",
        ReviewFilter::Passed => "ps.is_passed",
        ReviewFilter::All => "TRUE",
    }
}

/// ILIKE 패턴 (와일드카드 문자 escape)
fn search_pattern(search: Option<&str>) -> Option<String> {
    let q = search?.trim();
    if q.is_empty() {
        return None;
    }
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{}%", escaped))
}

#[async_trait]
impl ReportRepository for Database {
    async fn dashboard_totals(&self, today_start: DateTime<Utc>) -> Result<DashboardTotals> {
        let totals = sqlx::query_as::<_, DashboardTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE NOT is_admin) AS total_students,
                (SELECT COUNT(*) FROM courses) AS total_courses,
                (SELECT COUNT(*) FROM enrollments) AS total_enrollments,
                (SELECT COUNT(*) FROM certificates) AS total_certificates,
                (SELECT COUNT(*) FROM lecture_progress WHERE is_completed) AS completed_lecture_views,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT
                    FROM payments WHERE payment_status = 'completed') AS total_sales,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT
                    FROM payments
                    WHERE payment_status = 'completed' AND created_at >= $1) AS today_sales
            "#
        )
        .bind(today_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn top_courses(&self, limit: i64) -> Result<Vec<CourseEnrollmentCount>> {
        let rows = sqlx::query_as::<_, CourseEnrollmentCount>(
            r#"
            SELECT c.id AS course_id, c.title, COUNT(e.id) AS enrollment_count
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            GROUP BY c.id, c.title
            ORDER BY enrollment_count DESC, c.id
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_submissions(
        &self,
        filter: &SubmissionFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<SubmissionOverview>, i64)> {
        let pattern = search_pattern(filter.search.as_deref());
        let where_clause = format!(
            r#"
            WHERE {}
              AND ($1::TEXT IS NULL
                   OR u.username ILIKE $1
                   OR s.title ILIKE $1
                   OR c.title ILIKE $1)
            "#,
            status_clause(filter.status)
        );

        let rows = sqlx::query_as::<_, SubmissionOverview>(&format!(
            r#"
            SELECT
                ps.id,
                ps.user_id,
                u.username,
                ps.subject_id,
                s.title AS subject_title,
                c.id AS course_id,
                c.title AS course_title,
                ps.file_path,
                ps.is_passed,
                ps.feedback,
                ps.submitted_at,
                ps.reviewed_at
            {} {}
            ORDER BY ps.submitted_at DESC, ps.id DESC
            LIMIT $2 OFFSET $3
            "#,
            SUBMISSION_FROM, where_clause
        ))
        .bind(pattern.as_deref())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        // 전체 개수
        let count: (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) {} {}",
            SUBMISSION_FROM, where_clause
        ))
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, count.0))
    }

    async fn course_progress(&self, recent_since: DateTime<Utc>) -> Result<Vec<CourseProgressRow>> {
        let rows = sqlx::query_as::<_, CourseProgressRow>(
            r#"
            SELECT
                c.id AS course_id,
                c.title,
                COUNT(DISTINCT e.id) AS student_count,
                COALESCE(AVG(e.progress_percentage), 0)::FLOAT8 AS average_progress,
                COUNT(DISTINCT ce.id) AS certificate_count,
                COUNT(DISTINCT ce.id) FILTER (WHERE ce.issued_at >= $1) AS recent_certificates
            FROM courses c
            LEFT JOIN enrollments e ON e.course_id = c.id
            LEFT JOIN certificates ce ON ce.enrollment_id = e.id
            GROUP BY c.id, c.title
            ORDER BY c.id
            "#
        )
        .bind(recent_since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn daily_activity(
        &self,
        course_id: i64,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DailyActivity>> {
        let rows = sqlx::query_as::<_, DailyActivity>(
            r#"
            SELECT
                lp.user_id,
                (lp.completed_at AT TIME ZONE 'UTC')::DATE AS day,
                COUNT(*) AS completed
            FROM lecture_progress lp
            JOIN lectures l ON l.id = lp.lecture_id
            JOIN subjects s ON s.id = l.subject_id
            WHERE s.course_id = $1
              AND lp.is_completed
              AND lp.completed_at >= $2
              AND lp.completed_at < $3
            GROUP BY lp.user_id, day
            "#
        )
        .bind(course_id)
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
