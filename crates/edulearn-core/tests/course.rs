use edulearn_core::ai::grading::{ERROR_FEEDBACK, grade_essay_response};
use edulearn_core::course::error::CourseError;
use edulearn_core::course::grading::submit_quiz;
use edulearn_core::course::progress::mark_complete;
use edulearn_core::llm_config::LlmConfig;
use edulearn_db::ai::feedback;
use edulearn_db::course::{enrollment, progress};
use edulearn_db::quiz::{attempt, response};
use edulearn_entity::ai::feedback::CONTENT_TYPE_QUIZ_RESPONSE;
use edulearn_entity::course::enrollment::Status as EnrollmentStatus;
use edulearn_entity::course::lesson_progress::Status as ProgressStatus;
use edulearn_entity::quiz::question::QuestionType;
use edulearn_model::quiz::{QuizSubmission, SubmittedResponse};
use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_question, create_quiz, create_user};
use edulearn_test_helpers::schema::memory_db;
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_submit_quiz_grades_choices_and_queues_essays() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();
    let course = create_course(&db, user.id, "Rust", true).await.unwrap();
    let lesson = create_lesson(&db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(&db, lesson.id).await.unwrap();
    let (choice, answers) = create_question(&db, quiz.id, QuestionType::MultipleChoice, 2, &[("yes", true), ("no", false)])
        .await
        .unwrap();
    let (short, _) = create_question(&db, quiz.id, QuestionType::ShortAnswer, 1, &[])
        .await
        .unwrap();
    let (essay, _) = create_question(&db, quiz.id, QuestionType::Essay, 2, &[]).await.unwrap();

    let submission = QuizSubmission {
        time_taken: 90,
        responses: vec![
            SubmittedResponse {
                question_id: choice.id,
                answer_ids: vec![answers[0].id],
                text_response: String::new(),
            },
            SubmittedResponse {
                question_id: short.id,
                answer_ids: vec![],
                text_response: "  Forty Two ".to_owned(),
            },
            SubmittedResponse {
                question_id: essay.id,
                answer_ids: vec![],
                text_response: "Ownership moves values.".to_owned(),
            },
        ],
    };
    let graded = submit_quiz(&db, user.id, &quiz, submission).await.unwrap();
    assert_eq!(graded.attempt.score, 60.0);
    assert!(graded.attempt.is_completed);
    assert!(!graded.passed);
    assert_eq!(graded.pending_essays.len(), 1);

    let essay_response = grade_essay_response(&db, &LlmConfig::default(), graded.pending_essays[0])
        .await
        .unwrap();
    assert_eq!(essay_response.score, 0.0);
    assert!(!essay_response.is_correct);
    assert_eq!(essay_response.feedback, ERROR_FEEDBACK);

    let attempt = attempt::Query::find_by_id(&db, graded.attempt.id).await.unwrap().unwrap();
    assert_eq!(attempt.score, 60.0);
    let recorded = feedback::Query::list_for_user(&db, user.id).await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].content_type, CONTENT_TYPE_QUIZ_RESPONSE);
    assert_eq!(recorded[0].content_id, Some(essay_response.id));
    assert_eq!(response::Query::list_for_attempt(&db, attempt.id).await.unwrap().len(), 3);
}

#[test(tokio::test)]
async fn test_submit_quiz_rejects_foreign_ids() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();
    let course = create_course(&db, user.id, "Rust", true).await.unwrap();
    let lesson = create_lesson(&db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(&db, lesson.id).await.unwrap();
    let (question, _) = create_question(&db, quiz.id, QuestionType::TrueFalse, 1, &[("true", true)])
        .await
        .unwrap();

    let unknown_question = Uuid::new_v4();
    let result = submit_quiz(
        &db,
        user.id,
        &quiz,
        QuizSubmission {
            time_taken: 0,
            responses: vec![SubmittedResponse {
                question_id: unknown_question,
                answer_ids: vec![],
                text_response: String::new(),
            }],
        },
    )
    .await;
    assert!(matches!(result, Err(CourseError::UnknownQuestion(id)) if id == unknown_question));

    let unknown_answer = Uuid::new_v4();
    let result = submit_quiz(
        &db,
        user.id,
        &quiz,
        QuizSubmission {
            time_taken: 0,
            responses: vec![SubmittedResponse {
                question_id: question.id,
                answer_ids: vec![unknown_answer],
                text_response: String::new(),
            }],
        },
    )
    .await;
    assert!(matches!(result, Err(CourseError::UnknownAnswer(id)) if id == unknown_answer));
    assert!(attempt::Query::list_for_user(&db, user.id).await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn test_submit_quiz_counts_each_question_once() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();
    let course = create_course(&db, user.id, "Traits", true).await.unwrap();
    let lesson = create_lesson(&db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(&db, lesson.id).await.unwrap();
    let (question, answers) = create_question(&db, quiz.id, QuestionType::MultipleChoice, 1, &[("yes", true), ("no", false)])
        .await
        .unwrap();
    let correct = SubmittedResponse {
        question_id: question.id,
        answer_ids: vec![answers[0].id],
        text_response: String::new(),
    };

    let result = submit_quiz(
        &db,
        user.id,
        &quiz,
        QuizSubmission {
            time_taken: 10,
            responses: vec![correct.clone(), correct.clone(), correct],
        },
    )
    .await;
    assert!(matches!(result, Err(CourseError::DuplicateQuestion(id)) if id == question.id));
    assert!(attempt::Query::list_for_user(&db, user.id).await.unwrap().is_empty());

    let graded = submit_quiz(
        &db,
        user.id,
        &quiz,
        QuizSubmission {
            time_taken: 10,
            responses: vec![SubmittedResponse {
                question_id: question.id,
                answer_ids: vec![answers[0].id, answers[0].id],
                text_response: String::new(),
            }],
        },
    )
    .await
    .unwrap();
    assert_eq!(graded.attempt.score, 100.0);
    assert!(graded.passed);
    let stored = response::Query::list_with_selected(&db, graded.attempt.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].1.len(), 1);
}

#[test(tokio::test)]
async fn test_mark_complete_finishes_enrollment() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();
    let course = create_course(&db, user.id, "Databases", true).await.unwrap();
    let first = create_lesson(&db, course.id, 1, true).await.unwrap();
    let second = create_lesson(&db, course.id, 2, true).await.unwrap();
    create_lesson(&db, course.id, 3, false).await.unwrap();

    let result = mark_complete(&db, user.id, &first).await;
    assert!(matches!(result, Err(CourseError::NotEnrolled)));

    enrollment::Mutation::enroll(&db, user.id, course.id).await.unwrap();
    let (progress_row, halfway) = mark_complete(&db, user.id, &first).await.unwrap();
    assert_eq!(progress_row.status, ProgressStatus::Completed);
    assert!(progress_row.completed_at.is_some());
    assert_eq!(halfway.progress, 50.0);
    assert_eq!(halfway.status, EnrollmentStatus::Active);

    let (_, finished) = mark_complete(&db, user.id, &second).await.unwrap();
    assert_eq!(finished.progress, 100.0);
    assert_eq!(finished.status, EnrollmentStatus::Completed);
    assert!(finished.completed_at.is_some());
    assert_eq!(progress::Query::count_completed_published(&db, finished.id).await.unwrap(), 2);
}
