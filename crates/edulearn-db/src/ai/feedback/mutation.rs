use chrono::Utc;
use edulearn_entity::ai::feedback::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        content_type: &str,
        content_id: Option<Uuid>,
        feedback: String,
        score: Option<f64>,
    ) -> Result<Model, DbErr> {
        let record = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            content_type: Set(content_type.to_owned()),
            content_id: Set(content_id),
            feedback: Set(feedback),
            score: Set(score),
            created_at: Set(Utc::now().naive_utc()),
        };
        Entity::insert(record)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to store ai feedback"))
    }
}
