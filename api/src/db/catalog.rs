//! Catalog queries (read-only)

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Course, Lecture, MissionQuestion, Subject, User};
use super::repository::CatalogRepository;
use super::Database;

const COURSE_COLUMNS: &str = r#"
    id, title, description, short_description, difficulty_level,
    estimated_time, credit, price, instructor_id, created_at, updated_at
"#;

/// 강의 조회는 항상 subjects 조인 (course_id 포함)
const LECTURE_SELECT: &str = r#"
    SELECT
        l.id,
        l.subject_id,
        s.course_id,
        l.title,
        l.description,
        l.order_index,
        l.lecture_type,
        l.video_url,
        l.duration
    FROM lectures l
    JOIN subjects s ON s.id = l.subject_id
"#;

#[async_trait]
impl CatalogRepository for Database {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, full_name, is_admin, created_at
            FROM users
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_courses(&self) -> Result<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses ORDER BY created_at DESC, id DESC",
            COURSE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn find_course(&self, id: i64) -> Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {} FROM courses WHERE id = $1",
            COURSE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(course)
    }

    async fn find_subject(&self, id: i64) -> Result<Option<Subject>> {
        let subject = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, course_id, title, description, order_index, subject_type
            FROM subjects
            WHERE id = $1
            "#
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subject)
    }

    async fn list_subjects(&self, course_id: i64) -> Result<Vec<Subject>> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT id, course_id, title, description, order_index, subject_type
            FROM subjects
            WHERE course_id = $1
            ORDER BY order_index
            "#
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    async fn find_lecture(&self, id: i64) -> Result<Option<Lecture>> {
        let lecture = sqlx::query_as::<_, Lecture>(&format!("{} WHERE l.id = $1", LECTURE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lecture)
    }

    async fn list_lectures(&self, course_id: i64) -> Result<Vec<Lecture>> {
        let lectures = sqlx::query_as::<_, Lecture>(&format!(
            "{} WHERE s.course_id = $1 ORDER BY s.order_index, l.order_index",
            LECTURE_SELECT
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lectures)
    }

    async fn list_questions(&self, lecture_id: i64) -> Result<Vec<MissionQuestion>> {
        let questions = sqlx::query_as::<_, MissionQuestion>(
            r#"
            SELECT
                id, lecture_id, question_text,
                option1, option2, option3, option4, option5,
                correct_answer, order_index
            FROM mission_questions
            WHERE lecture_id = $1
            ORDER BY order_index, id
            "#
        )
        .bind(lecture_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }
}
