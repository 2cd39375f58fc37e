use chrono::Utc;
use edulearn_entity::quiz::quiz::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, lesson_id: Uuid, quiz: ActiveModel) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let quiz = ActiveModel {
            id: Set(Uuid::new_v4()),
            lesson_id: Set(lesson_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..quiz
        };
        Entity::insert(quiz)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create quiz"))
    }

    pub async fn update<C: ConnectionTrait>(conn: &C, quiz: ActiveModel) -> Result<Model, DbErr> {
        ActiveModel {
            updated_at: Set(Utc::now().naive_utc()),
            created_at: NotSet,
            ..quiz
        }
        .update(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update quiz"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
