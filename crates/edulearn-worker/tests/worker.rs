use edulearn_core::ai::grading::ERROR_FEEDBACK;
use edulearn_core::llm_config::LlmConfig;
use edulearn_db::ai::embedding;
use edulearn_db::quiz::{attempt, response};
use edulearn_entity::quiz::question::QuestionType;
use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_question, create_quiz, create_user};
use edulearn_test_helpers::schema::memory_db;
use edulearn_worker::error::TaskError;
use edulearn_worker::{Task, Worker, spawn};
use std::sync::Arc;
use test_log::test;
use uuid::Uuid;

#[test(tokio::test)]
async fn test_handle_grades_essay() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();
    let course = create_course(&db, user.id, "Writing", true).await.unwrap();
    let lesson = create_lesson(&db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(&db, lesson.id).await.unwrap();
    let (question, _) = create_question(&db, quiz.id, QuestionType::Essay, 5, &[]).await.unwrap();
    let created = attempt::Mutation::create(&db, user.id, quiz.id, 10).await.unwrap();
    let stored = response::Mutation::create(&db, created.id, question.id, "An essay".to_owned(), 0.0, false, &[])
        .await
        .unwrap();

    let worker = Worker::new(db.clone(), Arc::new(LlmConfig::default()));
    worker.handle(Task::GradeEssayResponse(stored.id)).await.unwrap();

    let graded = response::Query::find_by_id(&db, stored.id).await.unwrap().unwrap();
    assert_eq!(graded.feedback, ERROR_FEEDBACK);

    let missing = worker.handle(Task::GradeEssayResponse(Uuid::new_v4())).await;
    assert!(matches!(missing, Err(TaskError::Ai(_))));
}

#[test(tokio::test)]
async fn test_spawned_worker_drains_queue() {
    let db = memory_db().await.unwrap();
    let user = create_user(&db, "student").await.unwrap();

    let (queue, handle) = spawn(db.clone(), Arc::new(LlmConfig::default()), None);
    queue.enqueue(Task::UpdateUserEmbedding(user.id));
    drop(queue);
    handle.await.unwrap();

    assert!(embedding::Query::find_user_embedding(&db, user.id).await.unwrap().is_some());
}
