use chrono::Utc;
use edulearn_entity::ai::chat_message::{ActiveModel, Entity, Model, Role};
use sea_orm::ActiveValue::Set;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        session_id: Uuid,
        role: Role,
        content: String,
    ) -> Result<Model, DbErr> {
        let message = ActiveModel {
            id: Set(Uuid::new_v4()),
            session_id: Set(session_id),
            role: Set(role),
            content: Set(content),
            created_at: Set(Utc::now().naive_utc()),
        };
        Entity::insert(message)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to store chat message"))
    }
}
