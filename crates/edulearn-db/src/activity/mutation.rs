use chrono::Utc;
use edulearn_entity::learning_activity::{self, ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use serde_json::Value;
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        activity_type: String,
        content_type: String,
        content_id: Option<Uuid>,
        metadata: Value,
    ) -> Result<Model, DbErr> {
        let activity = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            activity_type: Set(activity_type),
            content_type: Set(content_type),
            content_id: Set(content_id),
            metadata: Set(metadata),
            timestamp: Set(Utc::now().naive_utc()),
        };
        Entity::insert(activity)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to record activity"))
    }

    /// Returns whether a row was deleted.
    pub async fn delete_for_user<C: ConnectionTrait>(conn: &C, id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let res = Entity::delete_many()
            .filter(learning_activity::Column::Id.eq(id))
            .filter(learning_activity::Column::UserId.eq(user_id))
            .exec(conn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}
