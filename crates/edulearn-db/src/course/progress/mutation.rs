use chrono::Utc;
use edulearn_entity::course::lesson_progress::{ActiveModel, Entity, Model, Status};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait};
use std::error::Error;
use uuid::Uuid;

use super::Query;

pub struct Mutation;

impl Mutation {
    pub async fn get_or_create<C: ConnectionTrait>(
        conn: &C,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Model, DbErr> {
        if let Some(progress) = Query::find(conn, enrollment_id, lesson_id).await? {
            return Ok(progress);
        }
        let progress = ActiveModel {
            id: Set(Uuid::new_v4()),
            enrollment_id: Set(enrollment_id),
            lesson_id: Set(lesson_id),
            status: Set(Status::NotStarted),
            time_spent: Set(0),
            started_at: Set(None),
            completed_at: Set(None),
            last_accessed_at: Set(Utc::now().naive_utc()),
        };
        Entity::insert(progress)
            .exec_with_returning(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to create lesson progress"))
    }

    pub async fn update<C: ConnectionTrait>(conn: &C, progress: ActiveModel) -> Result<Model, DbErr> {
        progress
            .update(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update lesson progress"))
    }
}
