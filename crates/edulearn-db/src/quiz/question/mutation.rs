use crate::util::FlattenTransactionResultExt;
use edulearn_entity::quiz::answer;
use edulearn_entity::quiz::question::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, TransactionTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Creates a question with its `(answer_text, is_correct)` answers.
    pub async fn create_with_answers<C: TransactionTrait>(
        conn: &C,
        quiz_id: Uuid,
        question: ActiveModel,
        answers: Vec<(String, bool)>,
    ) -> Result<(Model, Vec<answer::Model>), DbErr> {
        conn.transaction::<_, (Model, Vec<answer::Model>), DbErr>(|txn| {
            Box::pin(async move {
                let question = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    quiz_id: Set(quiz_id),
                    ..question
                };
                let question = Entity::insert(question).exec_with_returning(txn).await?;

                let mut created = Vec::with_capacity(answers.len());
                for (answer_text, is_correct) in answers {
                    let answer = answer::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        question_id: Set(question.id),
                        answer_text: Set(answer_text),
                        is_correct: Set(is_correct),
                    };
                    created.push(answer::Entity::insert(answer).exec_with_returning(txn).await?);
                }
                Ok((question, created))
            })
        })
        .await
        .flatten_res()
        .inspect_err(|error: &DbErr| tracing::error!(error = error as &dyn Error, "failed to create question"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
