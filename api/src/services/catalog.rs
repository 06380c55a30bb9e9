//! Course catalog views and the outline shared by completion / navigation.

use serde::Serialize;
use skillbridge_core::CourseOutline;

use crate::db::{Course, Lecture, Repository, Subject};
use crate::error::ApiError;

/// 과정 구조 (과목 + 강의 순서) 로드
pub async fn course_outline(repo: &dyn Repository, course_id: i64) -> anyhow::Result<CourseOutline> {
    let subjects = repo.list_subjects(course_id).await?;
    let lectures = repo.list_lectures(course_id).await?;

    let mut outline = CourseOutline::default();
    for subject in &subjects {
        outline.push_subject(subject.id, subject.order_index, subject.subject_type);
    }
    for lecture in &lectures {
        outline.push_lecture(lecture.subject_id, lecture.id, lecture.order_index, lecture.lecture_type);
    }
    Ok(outline)
}

#[derive(Debug, Serialize)]
pub struct SubjectDetail {
    #[serde(flatten)]
    pub subject: Subject,
    pub lectures: Vec<Lecture>,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub subjects: Vec<SubjectDetail>,
    pub total_lectures: usize,
}

pub async fn course_detail(repo: &dyn Repository, course_id: i64) -> Result<CourseDetail, ApiError> {
    let course = repo
        .find_course(course_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Course {}", course_id)))?;

    let subjects = repo.list_subjects(course_id).await?;
    let mut lectures = repo.list_lectures(course_id).await?;
    let total_lectures = lectures.len();

    let subjects = subjects
        .into_iter()
        .map(|subject| {
            let (own, rest): (Vec<_>, Vec<_>) =
                lectures.drain(..).partition(|l| l.subject_id == subject.id);
            lectures = rest;
            SubjectDetail { subject, lectures: own }
        })
        .collect();

    Ok(CourseDetail {
        course,
        subjects,
        total_lectures,
    })
}
