use edulearn_entity::quiz::response::{ActiveModel, Entity, Model};
use edulearn_entity::quiz::response_answer;
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    #[allow(clippy::too_many_arguments)]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        attempt_id: Uuid,
        question_id: Uuid,
        text_response: String,
        score: f64,
        is_correct: bool,
        selected_answers: &[Uuid],
    ) -> Result<Model, DbErr> {
        let response = ActiveModel {
            id: Set(Uuid::new_v4()),
            attempt_id: Set(attempt_id),
            question_id: Set(question_id),
            text_response: Set(text_response),
            score: Set(score),
            is_correct: Set(is_correct),
            feedback: Set(String::new()),
        };
        let response = Entity::insert(response)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to store quiz response"))?;

        if !selected_answers.is_empty() {
            let rows = selected_answers.iter().map(|answer_id| response_answer::ActiveModel {
                response_id: Set(response.id),
                answer_id: Set(*answer_id),
            });
            response_answer::Entity::insert_many(rows).exec_without_returning(conn).await?;
        }
        Ok(response)
    }

    pub async fn grade<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        score: f64,
        is_correct: bool,
        feedback: String,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            score: Set(score),
            is_correct: Set(is_correct),
            feedback: Set(feedback),
            ..Default::default()
        }
        .update(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to store grade"))
    }
}
