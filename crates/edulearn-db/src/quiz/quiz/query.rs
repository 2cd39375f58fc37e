use edulearn_entity::quiz::quiz::{self, Entity as Quiz, Model as QuizModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn list_for_lesson<C: ConnectionTrait>(conn: &C, lesson_id: Uuid) -> Result<Vec<QuizModel>, DbErr> {
        Quiz::find()
            .filter(quiz::Column::LessonId.eq(lesson_id))
            .order_by_asc(quiz::Column::CreatedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list quizzes"))
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<QuizModel>, DbErr> {
        Quiz::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, %id, "failed to load quiz"))
    }

    pub async fn find_for_lesson<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<QuizModel>, DbErr> {
        Quiz::find_by_id(id)
            .filter(quiz::Column::LessonId.eq(lesson_id))
            .one(conn)
            .await
    }

    pub async fn find_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<QuizModel>, DbErr> {
        Quiz::find().filter(quiz::Column::Id.is_in(ids)).all(conn).await
    }

    pub async fn list_for_lessons<C: ConnectionTrait>(conn: &C, lesson_ids: Vec<Uuid>) -> Result<Vec<QuizModel>, DbErr> {
        Quiz::find().filter(quiz::Column::LessonId.is_in(lesson_ids)).all(conn).await
    }
}
