use chrono::Utc;
use edulearn_entity::course::lesson::{ActiveModel, Entity, Model};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    pub async fn create<C: ConnectionTrait>(conn: &C, course_id: Uuid, lesson: ActiveModel) -> Result<Model, DbErr> {
        let now = Utc::now().naive_utc();
        let lesson = ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..lesson
        };
        Entity::insert(lesson)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create lesson"))
    }

    pub async fn update<C: ConnectionTrait>(conn: &C, lesson: ActiveModel) -> Result<Model, DbErr> {
        let lesson = ActiveModel {
            updated_at: Set(Utc::now().naive_utc()),
            created_at: NotSet,
            ..lesson
        };
        lesson
            .update(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update lesson"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id)
            .exec(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, %id, "failed to delete lesson"))?;
        Ok(())
    }
}
