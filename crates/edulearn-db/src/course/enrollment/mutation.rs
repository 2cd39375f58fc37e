use crate::util::FlattenTransactionResultExt;
use chrono::{NaiveDateTime, Utc};
use edulearn_entity::course::enrollment::{ActiveModel, Entity, Model, Status};
use edulearn_entity::course::{lesson, lesson_progress};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use std::error::Error;
use uuid::Uuid;

pub struct Mutation;

impl Mutation {
    /// Creates the enrollment and a not started progress row for every published lesson.
    pub async fn enroll<C: TransactionTrait>(conn: &C, user_id: Uuid, course_id: Uuid) -> Result<Model, DbErr> {
        conn.transaction::<_, Model, DbErr>(|txn| {
            Box::pin(async move {
                let now = Utc::now().naive_utc();
                let enrollment = ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    course_id: Set(course_id),
                    status: Set(Status::Active),
                    progress: Set(0.0),
                    enrolled_at: Set(now),
                    completed_at: Set(None),
                };
                let enrollment = Entity::insert(enrollment).exec_with_returning(txn).await?;

                let lessons = lesson::Entity::find()
                    .filter(lesson::Column::CourseId.eq(course_id))
                    .filter(lesson::Column::IsPublished.eq(true))
                    .all(txn)
                    .await?;

                let rows: Vec<_> = lessons
                    .into_iter()
                    .map(|lesson| lesson_progress::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        enrollment_id: Set(enrollment.id),
                        lesson_id: Set(lesson.id),
                        status: Set(lesson_progress::Status::NotStarted),
                        time_spent: Set(0),
                        started_at: Set(None),
                        completed_at: Set(None),
                        last_accessed_at: Set(now),
                    })
                    .collect();
                if !rows.is_empty() {
                    lesson_progress::Entity::insert_many(rows).exec_without_returning(txn).await?;
                }
                Ok(enrollment)
            })
        })
        .await
        .flatten_res()
        .inspect_err(|error: &DbErr| tracing::error!(error = error as &dyn Error, "failed to enroll user"))
    }

    pub async fn update_progress<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        progress: f64,
        status: Status,
        completed_at: Option<NaiveDateTime>,
    ) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            progress: Set(progress),
            status: Set(status),
            completed_at: Set(completed_at),
            ..Default::default()
        }
        .update(conn)
        .await
    }

    pub async fn update_status<C: ConnectionTrait>(conn: &C, id: Uuid, status: Status) -> Result<Model, DbErr> {
        ActiveModel {
            id: Unchanged(id),
            status: Set(status),
            ..Default::default()
        }
        .update(conn)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to update enrollment status"))
    }

    pub async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), DbErr> {
        Entity::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
