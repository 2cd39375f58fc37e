use chrono::Utc;
use edulearn_entity::course::course::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, course: ActiveModel) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let course = ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set(now),
            updated_at: Set(now),
            ..course
        };
        Entity::insert(course)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create course"))
    }

    pub async fn update<C: ConnectionTrait>(conn: &C, course: ActiveModel) -> Result<Model, DbErr> {
        let course = ActiveModel {
            updated_at: Set(Utc::now().naive_utc()),
            created_at: NotSet,
            ..course
        };
        course
            .update(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update course"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id)
            .exec(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, %id, "failed to delete course"))?;
        Ok(())
    }
}
