//! Completion Evaluation
//!
//! Decides whether a learner has met every graduation requirement of a course.
//!
//! # Requirements
//! 1. Every midterm/final subject has a passed project submission.
//! 2. Every video lecture of a normal subject has a completed progress record.
//! 3. Every mission lecture of a normal subject has a passed attempt.
//!
//! # Evaluation Order
//! Exam subjects are checked first, then normal subjects in `order_index`
//! order. The first unmet requirement is reported.
//!
//! Nothing is cached between calls: the caller loads a fresh `LearnerRecord`
//! and the outcome is recomputed from scratch, so repeated triggers cannot
//! drift.

use std::collections::HashSet;

use serde::Serialize;

use crate::status::{LectureType, SubjectType};

/// One lecture inside a subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureOutline {
    pub id: i64,
    pub order_index: i32,
    pub lecture_type: LectureType,
}

/// One subject of a course with its ordered lectures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectOutline {
    pub id: i64,
    pub order_index: i32,
    pub subject_type: SubjectType,
    pub lectures: Vec<LectureOutline>,
}

/// Course curriculum shape, subjects and lectures kept in `order_index` order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseOutline {
    pub subjects: Vec<SubjectOutline>,
}

impl CourseOutline {
    /// Add a subject; keeps subjects ordered by `order_index`.
    pub fn push_subject(&mut self, id: i64, order_index: i32, subject_type: SubjectType) {
        self.subjects.push(SubjectOutline {
            id,
            order_index,
            subject_type,
            lectures: Vec::new(),
        });
        self.subjects.sort_by_key(|s| (s.order_index, s.id));
    }

    /// Add a lecture to an already pushed subject.
    ///
    /// Returns `false` when the subject is unknown.
    pub fn push_lecture(
        &mut self,
        subject_id: i64,
        id: i64,
        order_index: i32,
        lecture_type: LectureType,
    ) -> bool {
        let Some(subject) = self.subjects.iter_mut().find(|s| s.id == subject_id) else {
            return false;
        };

        subject.lectures.push(LectureOutline {
            id,
            order_index,
            lecture_type,
        });
        subject.lectures.sort_by_key(|l| (l.order_index, l.id));
        true
    }

    /// All lectures of the course in curriculum order.
    pub fn lectures(&self) -> impl Iterator<Item = (&SubjectOutline, &LectureOutline)> {
        self.subjects
            .iter()
            .flat_map(|s| s.lectures.iter().map(move |l| (s, l)))
    }

    pub fn total_lectures(&self) -> usize {
        self.subjects.iter().map(|s| s.lectures.len()).sum()
    }

    pub fn subject_of(&self, lecture_id: i64) -> Option<&SubjectOutline> {
        self.subjects
            .iter()
            .find(|s| s.lectures.iter().any(|l| l.id == lecture_id))
    }
}

/// What a learner has achieved inside one course
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnerRecord {
    /// lecture ids with `is_completed = true`
    pub completed_lectures: HashSet<i64>,
    /// mission lecture ids with at least one passed attempt
    pub passed_missions: HashSet<i64>,
    /// exam subject ids with at least one passed project submission
    pub passed_projects: HashSet<i64>,
}

/// 미충족 수료 조건
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    Project { subject_id: i64 },
    Lecture { lecture_id: i64 },
    Mission { lecture_id: i64 },
}

/// Evaluation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Satisfied,
    Unmet(Requirement),
}

impl Completion {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Completion::Satisfied)
    }
}

/// Evaluate every graduation requirement of `outline` against `record`.
pub fn evaluate(outline: &CourseOutline, record: &LearnerRecord) -> Completion {
    // 중간/기말고사 과목: 통과한 프로젝트 제출 필요
    for subject in outline.subjects.iter().filter(|s| s.subject_type.is_exam()) {
        if !record.passed_projects.contains(&subject.id) {
            return Completion::Unmet(Requirement::Project {
                subject_id: subject.id,
            });
        }
    }

    // 일반 과목: 모든 강의 완료 (미션은 통과 기록 기준)
    for subject in outline
        .subjects
        .iter()
        .filter(|s| s.subject_type == SubjectType::Normal)
    {
        for lecture in &subject.lectures {
            match lecture.lecture_type {
                LectureType::Video if !record.completed_lectures.contains(&lecture.id) => {
                    return Completion::Unmet(Requirement::Lecture {
                        lecture_id: lecture.id,
                    });
                }
                LectureType::Mission if !record.passed_missions.contains(&lecture.id) => {
                    return Completion::Unmet(Requirement::Mission {
                        lecture_id: lecture.id,
                    });
                }
                _ => {}
            }
        }
    }

    Completion::Satisfied
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outline() -> CourseOutline {
        let mut outline = CourseOutline::default();
        outline.push_subject(2, 2, SubjectType::Midterm);
        outline.push_subject(1, 1, SubjectType::Normal);
        outline.push_lecture(1, 12, 2, LectureType::Mission);
        outline.push_lecture(1, 11, 1, LectureType::Video);
        outline
    }

    #[test]
    fn test_outline_keeps_order() {
        let outline = outline();
        assert_eq!(outline.subjects[0].id, 1);
        assert_eq!(outline.subjects[0].lectures[0].id, 11);
        assert_eq!(outline.total_lectures(), 2);
        assert_eq!(outline.subject_of(12).map(|s| s.id), Some(1));
        assert!(!outline.clone().push_lecture(99, 1, 1, LectureType::Video));
    }

    #[test]
    fn test_exam_checked_first() {
        let record = LearnerRecord::default();
        assert_eq!(
            evaluate(&outline(), &record),
            Completion::Unmet(Requirement::Project { subject_id: 2 })
        );
    }

    #[test]
    fn test_mission_requires_pass_not_progress() {
        let mut record = LearnerRecord::default();
        record.passed_projects.insert(2);
        record.completed_lectures.insert(11);
        record.completed_lectures.insert(12);

        assert_eq!(
            evaluate(&outline(), &record),
            Completion::Unmet(Requirement::Mission { lecture_id: 12 })
        );

        record.passed_missions.insert(12);
        assert!(evaluate(&outline(), &record).is_satisfied());
    }

    #[test]
    fn test_empty_course_is_satisfied() {
        assert!(evaluate(&CourseOutline::default(), &LearnerRecord::default()).is_satisfied());
    }
}
