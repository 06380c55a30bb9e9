//! Learning Navigation
//!
//! Resolves where a learner should continue ("이어서 학습하기") and the
//! previous/next lecture around the one being watched.

use serde::Serialize;

use crate::completion::{CourseOutline, LearnerRecord};
use crate::status::LectureType;

/// 다음 학습 항목
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "item_type", rename_all = "snake_case")]
pub enum NextItem {
    Project { subject_id: i64 },
    VideoLecture { lecture_id: i64 },
    Mission { lecture_id: i64 },
    Completed,
}

/// Walk subjects in order and return the first unfinished item.
///
/// An exam subject without a passed project comes back as `Project`; inside
/// every subject the first lecture without a completed progress record comes
/// back as `VideoLecture` or `Mission`.
pub fn next_learning_item(outline: &CourseOutline, record: &LearnerRecord) -> NextItem {
    for subject in &outline.subjects {
        if subject.subject_type.is_exam() && !record.passed_projects.contains(&subject.id) {
            return NextItem::Project {
                subject_id: subject.id,
            };
        }

        if let Some(lecture) = subject
            .lectures
            .iter()
            .find(|l| !record.completed_lectures.contains(&l.id))
        {
            return match lecture.lecture_type {
                LectureType::Video => NextItem::VideoLecture {
                    lecture_id: lecture.id,
                },
                LectureType::Mission => NextItem::Mission {
                    lecture_id: lecture.id,
                },
            };
        }
    }

    NextItem::Completed
}

/// Previous and next lecture inside the same subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LectureNeighbours {
    pub previous: Option<i64>,
    pub next: Option<i64>,
}

/// Neighbours of `lecture_id` within its subject. Unknown lectures have none.
pub fn neighbours(outline: &CourseOutline, lecture_id: i64) -> LectureNeighbours {
    let Some(subject) = outline.subject_of(lecture_id) else {
        return LectureNeighbours::default();
    };

    let lectures = &subject.lectures;
    let Some(pos) = lectures.iter().position(|l| l.id == lecture_id) else {
        return LectureNeighbours::default();
    };

    LectureNeighbours {
        previous: pos.checked_sub(1).map(|i| lectures[i].id),
        next: lectures.get(pos + 1).map(|l| l.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::SubjectType;

    fn outline() -> CourseOutline {
        let mut outline = CourseOutline::default();
        outline.push_subject(1, 1, SubjectType::Normal);
        outline.push_lecture(1, 10, 1, LectureType::Video);
        outline.push_lecture(1, 11, 2, LectureType::Mission);
        outline.push_lecture(1, 12, 3, LectureType::Video);
        outline.push_subject(2, 2, SubjectType::Final);
        outline
    }

    #[test]
    fn test_next_item_walks_in_order() {
        let outline = outline();
        let mut record = LearnerRecord::default();
        assert_eq!(
            next_learning_item(&outline, &record),
            NextItem::VideoLecture { lecture_id: 10 }
        );

        record.completed_lectures.insert(10);
        assert_eq!(
            next_learning_item(&outline, &record),
            NextItem::Mission { lecture_id: 11 }
        );

        record.completed_lectures.extend([11, 12]);
        assert_eq!(
            next_learning_item(&outline, &record),
            NextItem::Project { subject_id: 2 }
        );

        record.passed_projects.insert(2);
        assert_eq!(next_learning_item(&outline, &record), NextItem::Completed);
    }

    #[test]
    fn test_neighbours() {
        let outline = outline();
        assert_eq!(
            neighbours(&outline, 10),
            LectureNeighbours {
                previous: None,
                next: Some(11)
            }
        );
        assert_eq!(
            neighbours(&outline, 12),
            LectureNeighbours {
                previous: Some(11),
                next: None
            }
        );
        assert_eq!(neighbours(&outline, 404), LectureNeighbours::default());
    }
}
