use edulearn_entity::user_preference::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, user_id: Uuid, preference: ActiveModel) -> Result<Model, DbErr> {
        let preference = ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            ..preference
        };
        Entity::insert(preference)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create preference"))
    }

    pub async fn update<C: ConnectionTrait>(conn: &C, preference: ActiveModel) -> Result<Model, DbErr> {
        preference
            .update(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update preference"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id)
            .exec(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to delete preference"))?;
        Ok(())
    }
}
