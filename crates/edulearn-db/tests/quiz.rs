use edulearn_db::quiz::{attempt, question, response};
use edulearn_entity::quiz::question::{ActiveModel as ActiveQuestionModel, QuestionType};
use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_question, create_quiz, create_user};
use edulearn_test_helpers::schema::memory_db;
use sea_orm::ActiveValue::Set;
use test_log::test;

#[test(tokio::test)]
async fn test_create_question_with_answers() {
    let db = &memory_db().await.unwrap();
    let author = create_user(db, "author").await.unwrap();
    let course = create_course(db, author.id, "Logic", true).await.unwrap();
    let lesson = create_lesson(db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(db, lesson.id).await.unwrap();

    let (created, answers) = question::Mutation::create_with_answers(
        db,
        quiz.id,
        ActiveQuestionModel {
            question_text: Set("Is water wet?".to_owned()),
            question_type: Set(QuestionType::TrueFalse),
            points: Set(2),
            position: Set(1),
            answer_explanation: Set(String::new()),
            ..Default::default()
        },
        vec![("True".to_owned(), true), ("False".to_owned(), false)],
    )
    .await
    .unwrap();
    create_question(db, quiz.id, QuestionType::ShortAnswer, 3, &[]).await.unwrap();

    assert_eq!(answers.len(), 2);
    let listed = question::Query::list_with_answers(db, quiz.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let (_, listed_answers) = listed.iter().find(|(q, _)| q.id == created.id).unwrap();
    assert_eq!(listed_answers.len(), 2);
    assert_eq!(question::Query::total_points(db, quiz.id).await.unwrap(), 5);
}

#[test(tokio::test)]
async fn test_responses_keep_selected_answers() {
    let db = &memory_db().await.unwrap();
    let author = create_user(db, "author").await.unwrap();
    let student = create_user(db, "student").await.unwrap();
    let course = create_course(db, author.id, "Sets", true).await.unwrap();
    let lesson = create_lesson(db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(db, lesson.id).await.unwrap();
    let (choice, answers) = create_question(
        db,
        quiz.id,
        QuestionType::MultipleChoice,
        1,
        &[("a", true), ("b", true), ("c", false)],
    )
    .await
    .unwrap();
    let (short, _) = create_question(db, quiz.id, QuestionType::ShortAnswer, 1, &[]).await.unwrap();

    let started = attempt::Mutation::create(db, student.id, quiz.id, 60).await.unwrap();
    let selected = [answers[0].id, answers[1].id];
    response::Mutation::create(db, started.id, choice.id, String::new(), 1.0, true, &selected)
        .await
        .unwrap();
    response::Mutation::create(db, started.id, short.id, "wrong".to_owned(), 0.0, false, &[])
        .await
        .unwrap();
    attempt::Mutation::complete(db, started.id, 50.0).await.unwrap();

    let rows = response::Query::list_with_selected(db, started.id).await.unwrap();
    let (_, chosen) = rows.iter().find(|(row, _)| row.question_id == choice.id).unwrap();
    let mut chosen = chosen.clone();
    chosen.sort();
    let mut expected = selected.to_vec();
    expected.sort();
    assert_eq!(chosen, expected);

    let incorrect = response::Query::list_for_user(db, student.id, true).await.unwrap();
    assert_eq!(incorrect.len(), 1);
    assert_eq!(incorrect[0].question_id, short.id);

    let latest = attempt::Query::latest_completed(db, student.id, quiz.id).await.unwrap().unwrap();
    assert_eq!(latest.id, started.id);
    assert!(latest.is_completed);
    assert!(latest.completed_at.is_some());
    assert!((latest.score - 50.0).abs() < f64::EPSILON);
}

#[test(tokio::test)]
async fn test_grade_response() {
    let db = &memory_db().await.unwrap();
    let author = create_user(db, "author").await.unwrap();
    let course = create_course(db, author.id, "Writing", true).await.unwrap();
    let lesson = create_lesson(db, course.id, 1, true).await.unwrap();
    let quiz = create_quiz(db, lesson.id).await.unwrap();
    let (essay, _) = create_question(db, quiz.id, QuestionType::Essay, 10, &[]).await.unwrap();
    let started = attempt::Mutation::create(db, author.id, quiz.id, 0).await.unwrap();
    let stored = response::Mutation::create(db, started.id, essay.id, "My essay".to_owned(), 0.0, false, &[])
        .await
        .unwrap();

    let graded = response::Mutation::grade(db, stored.id, 8.0, true, "Well argued".to_owned())
        .await
        .unwrap();

    assert!(graded.is_correct);
    assert_eq!(graded.feedback, "Well argued");
    assert_eq!(graded.text_response, "My essay");
}
