use edulearn_entity::quiz::answer::{self, Model as AnswerModel};
use edulearn_entity::quiz::question::{self, Entity as Question, Model as QuestionModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn list_for_quiz<C: ConnectionTrait>(conn: &C, quiz_id: Uuid) -> Result<Vec<QuestionModel>, DbErr> {
        Question::find()
            .filter(question::Column::QuizId.eq(quiz_id))
            .order_by_asc(question::Column::Position)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load questions"))
    }

    /// Questions of a quiz in order, each with its answers.
    pub async fn list_with_answers<C: ConnectionTrait>(
        conn: &C,
        quiz_id: Uuid,
    ) -> Result<Vec<(QuestionModel, Vec<AnswerModel>)>, DbErr> {
        Question::find()
            .filter(question::Column::QuizId.eq(quiz_id))
            .order_by_asc(question::Column::Position)
            .find_with_related(answer::Entity)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load questions with answers"))
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<QuestionModel>, DbErr> {
        Question::find_by_id(id).one(conn).await
    }

    pub async fn find_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<QuestionModel>, DbErr> {
        Question::find().filter(question::Column::Id.is_in(ids)).all(conn).await
    }

    pub async fn total_points<C: ConnectionTrait>(conn: &C, quiz_id: Uuid) -> Result<i64, DbErr> {
        let questions = Self::list_for_quiz(conn, quiz_id).await?;
        Ok(questions.iter().map(|question| i64::from(question.points)).sum())
    }
}
