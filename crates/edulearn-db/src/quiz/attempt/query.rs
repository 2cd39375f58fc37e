use edulearn_entity::quiz::attempt::{self, Entity as Attempt, Model as AttemptModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<AttemptModel>, DbErr> {
        Attempt::find_by_id(id).one(conn).await
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<AttemptModel>, DbErr> {
        Attempt::find_by_id(id)
            .filter(attempt::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load quiz attempt"))
    }

    /// Newest first.
    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<AttemptModel>, DbErr> {
        Attempt::find()
            .filter(attempt::Column::UserId.eq(user_id))
            .order_by_desc(attempt::Column::StartedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list quiz attempts"))
    }

    pub async fn list_completed_for_quiz<C: ConnectionTrait>(
        conn: &C,
        quiz_id: Uuid,
    ) -> Result<Vec<AttemptModel>, DbErr> {
        Attempt::find()
            .filter(attempt::Column::QuizId.eq(quiz_id))
            .filter(attempt::Column::IsCompleted.eq(true))
            .order_by_desc(attempt::Column::StartedAt)
            .all(conn)
            .await
    }

    pub async fn latest_completed<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        quiz_id: Uuid,
    ) -> Result<Option<AttemptModel>, DbErr> {
        Attempt::find()
            .filter(attempt::Column::UserId.eq(user_id))
            .filter(attempt::Column::QuizId.eq(quiz_id))
            .filter(attempt::Column::IsCompleted.eq(true))
            .order_by_desc(attempt::Column::StartedAt)
            .one(conn)
            .await
    }

    pub async fn list_completed_for_user_quizzes<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        quiz_ids: Vec<Uuid>,
    ) -> Result<Vec<AttemptModel>, DbErr> {
        Attempt::find()
            .filter(attempt::Column::UserId.eq(user_id))
            .filter(attempt::Column::QuizId.is_in(quiz_ids))
            .filter(attempt::Column::IsCompleted.eq(true))
            .all(conn)
            .await
    }
}
