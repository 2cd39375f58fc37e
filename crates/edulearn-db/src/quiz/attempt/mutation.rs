use chrono::Utc;
use edulearn_entity::quiz::attempt::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        quiz_id: Uuid,
        time_taken: i32,
    ) -> Result<Model, DbErr> {
        let attempt = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            quiz_id: Set(quiz_id),
            score: Set(0.0),
            time_taken: Set(time_taken),
            is_completed: Set(false),
            started_at: Set(Utc::now().naive_utc()),
            completed_at: Set(None),
        };
        Entity::insert(attempt)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create quiz attempt"))
    }

    pub async fn complete<C: ConnectionTrait>(conn: &C, id: Uuid, score: f64) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            score: Set(score),
            is_completed: Set(true),
            completed_at: Set(Some(Utc::now().naive_utc())),
            ..Default::default()
        }
        .update(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to complete quiz attempt"))
    }

    pub async fn update_score<C: ConnectionTrait>(conn: &C, id: Uuid, score: f64) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            score: Set(score),
            ..Default::default()
        }
        .update(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update quiz attempt score"))
    }
}
