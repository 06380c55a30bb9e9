//! Progress Recorder
//!
//! 학습자가 강의를 보고, 미션을 풀고, 프로젝트를 제출하는 흐름.
//! 학습 기록을 남긴 뒤 진도율을 다시 계산하고 수료 판정을 호출한다.
//!
//! ```text
//! video GET ──▶ complete_lecture ──▶ update_progress ──▶ on_learning_event
//! mission POST ─▶ grade ─(passed)─▶ complete_lecture ──▶ update_progress ──▶ on_learning_event
//! project review ─(passed)──────────────────────────────────────────────▶ on_learning_event
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use skillbridge_core::mission::{outcomes, AnswerKey, Answers};
use skillbridge_core::{
    neighbours, next_learning_item, progress_percentage, score_answers, EnrollmentStatus,
    LectureType, NextItem, PASS_THRESHOLD,
};

use crate::auth::AuthUser;
use crate::db::{
    Certificate, Enrollment, Lecture, MissionAttempt, MissionQuestion, ProjectSubmission,
    Repository,
};
use crate::error::ApiError;
use crate::services::catalog::course_outline;
use crate::services::completion::{on_learning_event, LearningEvent};
use crate::services::storage::MediaStorage;

// ============ Views ============

#[derive(Debug, Serialize)]
pub struct DashboardView {
    /// status = enrolled
    pub in_progress: Vec<Enrollment>,
    /// status = completed / certified
    pub finished: Vec<Enrollment>,
    pub certificates: Vec<Certificate>,
}

#[derive(Debug, Serialize)]
pub struct VideoLectureView {
    pub lecture: Lecture,
    /// 이번 조회로 처음 완료 처리되었는지
    pub newly_completed: bool,
    pub previous_lecture_id: Option<i64>,
    pub next_lecture_id: Option<i64>,
    pub progress_percentage: i32,
    pub enrollment_status: EnrollmentStatus,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MissionView {
    /// 응시 화면 (정답 제외)
    Open {
        lecture: Lecture,
        questions: Vec<MissionQuestion>,
        pass_threshold: i32,
    },
    /// 이미 통과한 미션은 결과로 대체
    Passed(MissionResultView),
}

#[derive(Debug, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub question_text: String,
    pub options: Vec<String>,
    pub chosen: Option<i32>,
    pub correct_answer: i32,
    pub is_correct: bool,
}

#[derive(Debug, Serialize)]
pub struct MissionResultView {
    pub attempt_id: i64,
    pub lecture_id: i64,
    pub lecture_title: String,
    pub score: i32,
    pub is_passed: bool,
    pub correct_count: usize,
    pub total_questions: usize,
    pub questions: Vec<QuestionResult>,
}

// ============ Helpers ============

/// 수강 중인 과정인지 확인
pub async fn require_enrollment(
    repo: &dyn Repository,
    user_id: i64,
    course_id: i64,
) -> Result<Enrollment, ApiError> {
    repo.find_enrollment(user_id, course_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("수강 중인 과정이 아닙니다".to_string()))
}

async fn require_lecture(
    repo: &dyn Repository,
    lecture_id: i64,
    kind: LectureType,
) -> Result<Lecture, ApiError> {
    repo.find_lecture(lecture_id)
        .await?
        .filter(|l| l.lecture_type == kind)
        .ok_or_else(|| ApiError::NotFound(format!("{} lecture {}", kind, lecture_id)))
}

/// 진도율 재계산
///
/// 과정에 강의가 하나도 없으면 건너뛴다. 수강 등록이 없으면 warn 후 건너뛴다.
pub async fn update_progress(
    repo: &dyn Repository,
    user_id: i64,
    course_id: i64,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<i32>> {
    let Some(enrollment) = repo.find_enrollment(user_id, course_id).await? else {
        tracing::warn!(user_id, course_id, "Progress update skipped: not enrolled");
        return Ok(None);
    };

    let total = repo.list_lectures(course_id).await?.len() as i64;
    let completed = repo.count_completed_lectures(user_id, course_id).await?;

    let Some(percentage) = progress_percentage(completed, total) else {
        return Ok(None);
    };
    repo.set_progress(enrollment.id, percentage, now).await?;

    tracing::debug!(
        enrollment_id = enrollment.id,
        "Progress {}/{} → {}%",
        completed,
        total,
        percentage
    );
    Ok(Some(percentage))
}

/// 강의 완료 기록 + 진도율 갱신. 이번 호출로 처음 완료되었으면 true
async fn record_lecture_completion(
    repo: &dyn Repository,
    user_id: i64,
    lecture: &Lecture,
    now: DateTime<Utc>,
) -> anyhow::Result<bool> {
    let newly_completed = repo.complete_lecture(user_id, lecture.id, now).await?;
    if newly_completed {
        update_progress(repo, user_id, lecture.course_id, now).await?;
    }
    Ok(newly_completed)
}

fn answer_keys(questions: &[MissionQuestion]) -> Vec<AnswerKey> {
    questions
        .iter()
        .map(|q| AnswerKey {
            question_id: q.id,
            correct_answer: q.correct_answer,
        })
        .collect()
}

fn result_view(
    lecture: &Lecture,
    attempt: &MissionAttempt,
    questions: &[MissionQuestion],
) -> MissionResultView {
    let keys = answer_keys(questions);
    let answers = &attempt.user_answers.0;
    let per_question = outcomes(&keys, answers);
    let correct_count = per_question.iter().filter(|o| o.is_correct).count();

    let questions = questions
        .iter()
        .zip(per_question)
        .map(|(q, outcome)| QuestionResult {
            question_id: q.id,
            question_text: q.question_text.clone(),
            options: q.options().iter().map(|o| o.to_string()).collect(),
            chosen: outcome.chosen,
            correct_answer: q.correct_answer,
            is_correct: outcome.is_correct,
        })
        .collect();

    MissionResultView {
        attempt_id: attempt.id,
        lecture_id: lecture.id,
        lecture_title: lecture.title.clone(),
        score: attempt.score,
        is_passed: attempt.is_passed,
        correct_count,
        total_questions: keys.len(),
        questions,
    }
}

// ============ Operations ============

/// 내 학습 현황
pub async fn dashboard(repo: &dyn Repository, user: &AuthUser) -> Result<DashboardView, ApiError> {
    let enrollments = repo.list_user_enrollments(user.user_id).await?;
    let certificates = repo.list_user_certificates(user.user_id).await?;

    let (finished, in_progress): (Vec<_>, Vec<_>) = enrollments
        .into_iter()
        .partition(|e| e.status.is_finished());

    Ok(DashboardView {
        in_progress,
        finished,
        certificates,
    })
}

/// 이어서 학습하기: 다음 학습 항목
pub async fn resume(repo: &dyn Repository, user: &AuthUser, course_id: i64) -> Result<NextItem, ApiError> {
    require_enrollment(repo, user.user_id, course_id).await?;

    let outline = course_outline(repo, course_id).await?;
    let record = repo.learner_record(user.user_id, course_id).await?;
    Ok(next_learning_item(&outline, &record))
}

/// 동영상 강의 시청: 첫 조회 시 자동 완료
pub async fn view_video_lecture(
    repo: &dyn Repository,
    user: &AuthUser,
    lecture_id: i64,
    now: DateTime<Utc>,
) -> Result<VideoLectureView, ApiError> {
    let lecture = require_lecture(repo, lecture_id, LectureType::Video).await?;
    let enrollment = require_enrollment(repo, user.user_id, lecture.course_id).await?;

    let newly_completed = record_lecture_completion(repo, user.user_id, &lecture, now).await?;
    if newly_completed {
        tracing::info!(user_id = user.user_id, lecture_id, "▶️  Video lecture completed");
    }

    on_learning_event(
        repo,
        user.user_id,
        lecture.course_id,
        LearningEvent::LectureCompleted { lecture_id },
        now,
    )
    .await;

    let outline = course_outline(repo, lecture.course_id).await?;
    let around = neighbours(&outline, lecture_id);
    // 진도율 / 수료 반영 후 다시 읽음
    let enrollment = repo
        .find_enrollment_by_id(enrollment.id)
        .await?
        .unwrap_or(enrollment);

    Ok(VideoLectureView {
        lecture,
        newly_completed,
        previous_lecture_id: around.previous,
        next_lecture_id: around.next,
        progress_percentage: enrollment.progress_percentage,
        enrollment_status: enrollment.status,
    })
}

/// 미션 응시 화면
pub async fn mission_view(
    repo: &dyn Repository,
    user: &AuthUser,
    lecture_id: i64,
) -> Result<MissionView, ApiError> {
    let lecture = require_lecture(repo, lecture_id, LectureType::Mission).await?;
    require_enrollment(repo, user.user_id, lecture.course_id).await?;

    let questions = repo.list_questions(lecture_id).await?;
    if let Some(passed) = repo.find_passed_attempt(user.user_id, lecture_id).await? {
        return Ok(MissionView::Passed(result_view(&lecture, &passed, &questions)));
    }

    Ok(MissionView::Open {
        lecture,
        questions,
        pass_threshold: PASS_THRESHOLD,
    })
}

/// 미션 답안 제출 및 채점
///
/// 이미 통과했다면 새 응시 없이 기존 결과를 돌려준다. 미통과 응시가 있으면
/// 그 응시를 재사용한다.
pub async fn submit_mission(
    repo: &dyn Repository,
    user: &AuthUser,
    lecture_id: i64,
    answers: Answers,
    now: DateTime<Utc>,
) -> Result<MissionResultView, ApiError> {
    let lecture = require_lecture(repo, lecture_id, LectureType::Mission).await?;
    require_enrollment(repo, user.user_id, lecture.course_id).await?;

    let questions = repo.list_questions(lecture_id).await?;
    if let Some(passed) = repo.find_passed_attempt(user.user_id, lecture_id).await? {
        return Ok(result_view(&lecture, &passed, &questions));
    }

    let attempt = match repo.find_open_attempt(user.user_id, lecture_id).await? {
        Some(attempt) => attempt,
        None => repo.start_attempt(user.user_id, lecture_id, now).await?,
    };

    let score = score_answers(&answer_keys(&questions), &answers);
    let attempt = repo
        .grade_attempt(attempt.id, &answers, score.score, score.is_passed, now)
        .await?;

    tracing::info!(
        user_id = user.user_id,
        lecture_id,
        "📝 Mission graded: {}/{} → {} ({})",
        score.correct,
        score.total,
        score.score,
        if score.is_passed { "passed" } else { "failed" }
    );

    if score.is_passed {
        record_lecture_completion(repo, user.user_id, &lecture, now).await?;
        on_learning_event(
            repo,
            user.user_id,
            lecture.course_id,
            LearningEvent::MissionPassed { lecture_id },
            now,
        )
        .await;
    }

    Ok(result_view(&lecture, &attempt, &questions))
}

/// 미션 결과 조회 (본인 응시만)
pub async fn mission_result(
    repo: &dyn Repository,
    user: &AuthUser,
    attempt_id: i64,
) -> Result<MissionResultView, ApiError> {
    let attempt = repo
        .find_attempt(attempt_id)
        .await?
        .filter(|a| a.user_id == user.user_id)
        .ok_or_else(|| ApiError::NotFound(format!("Mission attempt {}", attempt_id)))?;

    let lecture = repo
        .find_lecture(attempt.lecture_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lecture {}", attempt.lecture_id)))?;
    let questions = repo.list_questions(lecture.id).await?;

    Ok(result_view(&lecture, &attempt, &questions))
}

/// 중간/기말고사 프로젝트 제출
pub async fn submit_project(
    repo: &dyn Repository,
    media: &MediaStorage,
    user: &AuthUser,
    subject_id: i64,
    filename: &str,
    contents: &[u8],
    now: DateTime<Utc>,
) -> Result<ProjectSubmission, ApiError> {
    let subject = repo
        .find_subject(subject_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Subject {}", subject_id)))?;

    if !subject.subject_type.is_exam() {
        return Err(ApiError::BadRequest(
            "프로젝트는 중간/기말고사 과목에만 제출할 수 있습니다".to_string(),
        ));
    }
    if filename.trim().is_empty() || contents.is_empty() {
        return Err(ApiError::ValidationError("project_file is required".to_string()));
    }
    require_enrollment(repo, user.user_id, subject.course_id).await?;

    let path = media
        .save_project(subject.subject_type, &user.username, filename, contents, now)
        .await?;
    let submission = repo
        .create_submission(user.user_id, subject_id, &path, now)
        .await?;

    tracing::info!(
        user_id = user.user_id,
        subject_id,
        submission_id = submission.id,
        "📤 Project submitted"
    );
    Ok(submission)
}

/// 제출물 조회 (본인 또는 관리자)
pub async fn project_detail(
    repo: &dyn Repository,
    user: &AuthUser,
    submission_id: i64,
) -> Result<ProjectSubmission, ApiError> {
    let submission = repo
        .find_submission(submission_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project submission {}", submission_id)))?;

    if !user.can_access(Some(submission.user_id)) {
        return Err(ApiError::Forbidden("본인 제출물만 조회할 수 있습니다".to_string()));
    }
    Ok(submission)
}

#[derive(Debug, Serialize)]
pub struct ReviewOutcome {
    pub submission: ProjectSubmission,
    /// 평가 후 해당 수강이 수료 상태인지
    pub course_finished: bool,
}

/// 프로젝트 평가 (관리자)
pub async fn review_project(
    repo: &dyn Repository,
    reviewer: &AuthUser,
    submission_id: i64,
    is_passed: bool,
    feedback: &str,
    now: DateTime<Utc>,
) -> Result<ReviewOutcome, ApiError> {
    let submission = repo
        .review_submission(submission_id, is_passed, feedback, reviewer.user_id, now)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project submission {}", submission_id)))?;

    tracing::info!(
        submission_id,
        reviewer_id = reviewer.user_id,
        is_passed,
        "Project reviewed"
    );

    let course_finished = if is_passed {
        let subject = repo
            .find_subject(submission.subject_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Subject {}", submission.subject_id)))?;
        on_learning_event(
            repo,
            submission.user_id,
            subject.course_id,
            LearningEvent::ProjectPassed {
                subject_id: subject.id,
            },
            now,
        )
        .await
    } else {
        false
    };

    Ok(ReviewOutcome {
        submission,
        course_finished,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::mock::MemoryRepository;
    use crate::db::{CatalogRepository, EnrollmentRepository, ProgressRepository};
    use skillbridge_core::SubjectType;

    struct Fixture {
        repo: MemoryRepository,
        user: AuthUser,
        admin: AuthUser,
        course: i64,
        videos: Vec<i64>,
        mission: i64,
        questions: Vec<i64>,
        final_subject: i64,
    }

    /// 과목1: 동영상 2 + 미션 1 (5문항, 정답 전부 3번), 과목2: 기말고사
    fn fixture() -> Fixture {
        let repo = MemoryRepository::new();
        let admin_id = repo.add_user("admin", true);
        let user_id = repo.add_user("kim", false);
        let course = repo.add_course("Rust 입문", 50_000);
        let normal = repo.add_subject(course, 1, SubjectType::Normal);
        let v1 = repo.add_lecture(normal, 1, LectureType::Video);
        let v2 = repo.add_lecture(normal, 2, LectureType::Video);
        let mission = repo.add_lecture(normal, 3, LectureType::Mission);
        let questions = (0..5).map(|_| repo.add_question(mission, 3)).collect();
        let final_subject = repo.add_subject(course, 2, SubjectType::Final);

        Fixture {
            repo,
            user: AuthUser { user_id, username: "kim".into(), is_admin: false },
            admin: AuthUser { user_id: admin_id, username: "admin".into(), is_admin: true },
            course,
            videos: vec![v1, v2],
            mission,
            questions,
            final_subject,
        }
    }

    fn answers(f: &Fixture, correct: usize) -> Answers {
        f.questions
            .iter()
            .enumerate()
            .map(|(i, q)| (*q, if i < correct { 3 } else { 1 }))
            .collect()
    }

    async fn enrolled() -> Fixture {
        let f = fixture();
        f.repo.enroll(f.user.user_id, f.course).await.unwrap();
        f
    }

    #[tokio::test]
    async fn test_video_auto_completes_on_first_view() {
        let f = enrolled().await;
        let now = Utc::now();

        let first = view_video_lecture(&f.repo, &f.user, f.videos[0], now).await.unwrap();
        assert!(first.newly_completed);
        // 3개 강의 중 1개 → 33%
        assert_eq!(first.progress_percentage, 33);
        assert_eq!(first.previous_lecture_id, None);
        assert_eq!(first.next_lecture_id, Some(f.videos[1]));

        let progress = f.repo.find_lecture_progress(f.user.user_id, f.videos[0]).await.unwrap().unwrap();
        assert!(progress.is_completed);
        assert_eq!(progress.completed_at, Some(now));

        // 재조회는 완료 시각을 바꾸지 않음
        let again = view_video_lecture(&f.repo, &f.user, f.videos[0], now + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(!again.newly_completed);
        let progress = f.repo.find_lecture_progress(f.user.user_id, f.videos[0]).await.unwrap().unwrap();
        assert_eq!(progress.completed_at, Some(now));
    }

    #[tokio::test]
    async fn test_video_requires_enrollment() {
        let f = fixture();
        let err = view_video_lecture(&f.repo, &f.user, f.videos[0], Utc::now()).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_mission_lecture_is_not_a_video() {
        let f = enrolled().await;
        let err = view_video_lecture(&f.repo, &f.user, f.mission, Utc::now()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_progress_is_monotonic() {
        let f = enrolled().await;
        let mut last = 0;
        for video in &f.videos {
            let view = view_video_lecture(&f.repo, &f.user, *video, Utc::now()).await.unwrap();
            assert!(view.progress_percentage >= last);
            last = view.progress_percentage;
        }
        assert_eq!(last, 66);
    }

    #[tokio::test]
    async fn test_mission_four_of_five_passes() {
        let f = enrolled().await;
        let result = submit_mission(&f.repo, &f.user, f.mission, answers(&f, 4), Utc::now())
            .await
            .unwrap();

        assert_eq!(result.score, 80);
        assert!(result.is_passed);
        assert_eq!(result.correct_count, 4);
        let progress = f.repo.find_lecture_progress(f.user.user_id, f.mission).await.unwrap();
        assert!(progress.map(|p| p.is_completed).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_mission_three_of_five_fails_and_attempt_is_reused() {
        let f = enrolled().await;
        let first = submit_mission(&f.repo, &f.user, f.mission, answers(&f, 3), Utc::now())
            .await
            .unwrap();
        assert_eq!(first.score, 60);
        assert!(!first.is_passed);
        assert!(f.repo.find_lecture_progress(f.user.user_id, f.mission).await.unwrap().is_none());

        let second = submit_mission(&f.repo, &f.user, f.mission, answers(&f, 5), Utc::now())
            .await
            .unwrap();
        assert_eq!(second.attempt_id, first.attempt_id);
        assert_eq!(second.score, 100);
    }

    #[tokio::test]
    async fn test_unknown_question_ids_count_as_wrong() {
        let f = enrolled().await;
        let mut bogus = answers(&f, 3);
        bogus.insert(9_999, 3);
        let result = submit_mission(&f.repo, &f.user, f.mission, bogus, Utc::now()).await.unwrap();
        assert_eq!(result.total_questions, 5);
        assert_eq!(result.score, 60);
    }

    #[tokio::test]
    async fn test_passed_mission_view_shows_result() {
        let f = enrolled().await;
        submit_mission(&f.repo, &f.user, f.mission, answers(&f, 5), Utc::now()).await.unwrap();

        match mission_view(&f.repo, &f.user, f.mission).await.unwrap() {
            MissionView::Passed(result) => assert_eq!(result.score, 100),
            MissionView::Open { .. } => panic!("expected passed result"),
        }
    }

    #[tokio::test]
    async fn test_mission_result_is_private() {
        let f = enrolled().await;
        let result = submit_mission(&f.repo, &f.user, f.mission, answers(&f, 2), Utc::now())
            .await
            .unwrap();

        let other_id = f.repo.add_user("lee", false);
        let other = AuthUser { user_id: other_id, username: "lee".into(), is_admin: false };
        assert!(matches!(
            mission_result(&f.repo, &other, result.attempt_id).await,
            Err(ApiError::NotFound(_))
        ));
        let own = mission_result(&f.repo, &f.user, result.attempt_id).await.unwrap();
        assert_eq!(own.questions[0].chosen, Some(3));
        assert!(!own.questions[4].is_correct);
    }

    #[tokio::test]
    async fn test_full_path_completes_after_final_review() {
        let f = enrolled().await;
        let now = Utc::now();
        for video in &f.videos {
            view_video_lecture(&f.repo, &f.user, *video, now).await.unwrap();
        }
        submit_mission(&f.repo, &f.user, f.mission, answers(&f, 5), now).await.unwrap();

        // 강의 / 미션 완료만으로는 수료 아님
        let enrollment = f.repo.find_enrollment(f.user.user_id, f.course).await.unwrap().unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Enrolled);
        assert_eq!(enrollment.progress_percentage, 100);

        let submission = f
            .repo
            .create_submission(f.user.user_id, f.final_subject, "projects/final/kim/x/p.zip", now)
            .await
            .unwrap();
        let outcome = review_project(&f.repo, &f.admin, submission.id, true, "훌륭합니다", now)
            .await
            .unwrap();
        assert!(outcome.course_finished);

        let enrollment = f.repo.find_enrollment(f.user.user_id, f.course).await.unwrap().unwrap();
        assert_eq!(enrollment.status, EnrollmentStatus::Completed);
        assert_eq!(enrollment.completed_at, Some(now));
    }

    #[tokio::test]
    async fn test_failed_review_does_not_complete() {
        let f = enrolled().await;
        let submission = f
            .repo
            .create_submission(f.user.user_id, f.final_subject, "p.zip", Utc::now())
            .await
            .unwrap();
        let outcome = review_project(&f.repo, &f.admin, submission.id, false, "보완 필요", Utc::now())
            .await
            .unwrap();
        assert!(!outcome.course_finished);
        assert_eq!(outcome.submission.feedback, "보완 필요");
        assert!(outcome.submission.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_resume_walks_the_course() {
        let f = enrolled().await;
        assert_eq!(
            resume(&f.repo, &f.user, f.course).await.unwrap(),
            NextItem::VideoLecture { lecture_id: f.videos[0] }
        );

        for video in &f.videos {
            view_video_lecture(&f.repo, &f.user, *video, Utc::now()).await.unwrap();
        }
        assert_eq!(
            resume(&f.repo, &f.user, f.course).await.unwrap(),
            NextItem::Mission { lecture_id: f.mission }
        );

        submit_mission(&f.repo, &f.user, f.mission, answers(&f, 5), Utc::now()).await.unwrap();
        assert_eq!(
            resume(&f.repo, &f.user, f.course).await.unwrap(),
            NextItem::Project { subject_id: f.final_subject }
        );
    }

    #[tokio::test]
    async fn test_project_on_normal_subject_rejected() {
        let f = enrolled().await;
        let normal = f.repo.find_lecture(f.videos[0]).await.unwrap().unwrap().subject_id;
        let media = MediaStorage::new(std::env::temp_dir().join("skillbridge-progress-test"));

        let err = submit_project(&f.repo, &media, &f.user, normal, "a.zip", b"x", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_project_submission_saved() {
        let f = enrolled().await;
        let root = std::env::temp_dir().join(format!("skillbridge-submit-{}", std::process::id()));
        let media = MediaStorage::new(&root);

        let submission = submit_project(&f.repo, &media, &f.user, f.final_subject, "final.zip", b"PK", Utc::now())
            .await
            .unwrap();
        assert!(submission.file_path.starts_with("projects/final/kim/"));
        assert!(submission.file_path.ends_with("/final.zip"));
        assert!(!submission.is_passed);

        let other = AuthUser { user_id: 4242, username: "x".into(), is_admin: false };
        assert!(matches!(
            project_detail(&f.repo, &other, submission.id).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(project_detail(&f.repo, &f.admin, submission.id).await.is_ok());
        let _ = tokio::fs::remove_dir_all(&root).await;
    }

    #[tokio::test]
    async fn test_dashboard_splits_by_status() {
        let f = enrolled().await;
        let other_course = f.repo.add_course("Go 입문", 30_000);
        f.repo.enroll(f.user.user_id, other_course).await.unwrap();

        let view = dashboard(&f.repo, &f.user).await.unwrap();
        assert_eq!(view.in_progress.len(), 2);
        assert!(view.finished.is_empty());
        assert!(view.certificates.is_empty());
    }
}
