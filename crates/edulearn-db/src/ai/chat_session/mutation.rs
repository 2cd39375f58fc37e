use chrono::Utc;
use edulearn_entity::ai::chat_session::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

use super::Query;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, user_id: Uuid, title: String) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let session = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            title: Set(title),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Entity::insert(session)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create chat session"))
    }

    pub async fn get_or_create<C: ConnectionTrait>(conn: &C, user_id: Uuid, title: &str) -> Result<Model, DbErr> {
        match Query::find_by_title(conn, user_id, title).await? {
            Some(session) => Ok(session),
            None => Self::create(conn, user_id, title.to_owned()).await,
        }
    }

    pub async fn rename<C: ConnectionTrait>(conn: &C, id: Uuid, title: String) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            title: Set(title),
            updated_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn touch<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            updated_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
