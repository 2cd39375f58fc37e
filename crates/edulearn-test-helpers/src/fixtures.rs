//! Rows inserted straight through the entities, bypassing the db layer.

use chrono::Utc;
use edulearn_entity::course::course::Level;
use edulearn_entity::course::{course, lesson};
use edulearn_entity::quiz::question::QuestionType;
use edulearn_entity::quiz::{answer, question, quiz};
use edulearn_entity::user;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, IntoActiveModel};
use serde_json::json;
use uuid::Uuid;

pub async fn create_user(db: &DatabaseConnection, username: &str) -> Result<user::Model, DbErr> {
    let now = Utc::now().naive_utc();
    user::Model {
        id: Uuid::new_v4(),
        email: format!("{username}@example.com"),
        username: username.to_owned(),
        password_hash: String::new(),
        first_name: username.to_owned(),
        last_name: "Tester".to_owned(),
        bio: String::new(),
        date_of_birth: None,
        profile_picture: None,
        interests: json!(["rust", "databases"]),
        learning_style: "visual".to_owned(),
        is_staff: false,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
    .into_active_model()
    .insert(db)
    .await
}

pub async fn create_course(
    db: &DatabaseConnection,
    instructor_id: Uuid,
    title: &str,
    is_published: bool,
) -> Result<course::Model, DbErr> {
    let now = Utc::now().naive_utc();
    course::Model {
        id: Uuid::new_v4(),
        title: title.to_owned(),
        slug: title.to_lowercase().replace(' ', "-"),
        description: format!("All about {title}"),
        short_description: title.to_owned(),
        category_id: None,
        instructor_id,
        level: Level::Beginner,
        duration: "4 weeks".to_owned(),
        prerequisites: String::new(),
        learning_objectives: json!([]),
        thumbnail: None,
        preview_video: None,
        is_published,
        is_featured: false,
        created_at: now,
        updated_at: now,
    }
    .into_active_model()
    .insert(db)
    .await
}

pub async fn create_lesson(
    db: &DatabaseConnection,
    course_id: Uuid,
    position: i32,
    is_published: bool,
) -> Result<lesson::Model, DbErr> {
    let now = Utc::now().naive_utc();
    lesson::Model {
        id: Uuid::new_v4(),
        course_id,
        title: format!("Lesson {position}"),
        slug: format!("lesson-{position}"),
        description: format!("Description of lesson {position}"),
        position,
        content: "<p>Lesson content</p>".to_owned(),
        video_url: None,
        duration: 30,
        is_published,
        is_free_preview: position == 1,
        created_at: now,
        updated_at: now,
    }
    .into_active_model()
    .insert(db)
    .await
}

pub async fn create_quiz(db: &DatabaseConnection, lesson_id: Uuid) -> Result<quiz::Model, DbErr> {
    let now = Utc::now().naive_utc();
    quiz::Model {
        id: Uuid::new_v4(),
        lesson_id,
        title: "Checkpoint".to_owned(),
        description: String::new(),
        time_limit: 0,
        passing_score: 70,
        created_at: now,
        updated_at: now,
    }
    .into_active_model()
    .insert(db)
    .await
}

/// Creates a question with one answer per `(text, is_correct)` pair.
pub async fn create_question(
    db: &DatabaseConnection,
    quiz_id: Uuid,
    question_type: QuestionType,
    points: i32,
    answers: &[(&str, bool)],
) -> Result<(question::Model, Vec<answer::Model>), DbErr> {
    let question = question::Model {
        id: Uuid::new_v4(),
        quiz_id,
        question_text: "What is the answer?".to_owned(),
        question_type,
        points,
        position: 0,
        answer_explanation: "forty two".to_owned(),
    }
    .into_active_model()
    .insert(db)
    .await?;

    let mut created = Vec::with_capacity(answers.len());
    for (text, is_correct) in answers {
        let answer = answer::Model {
            id: Uuid::new_v4(),
            question_id: question.id,
            answer_text: (*text).to_owned(),
            is_correct: *is_correct,
        }
        .into_active_model()
        .insert(db)
        .await?;
        created.push(answer);
    }
    Ok((question, created))
}
