use edulearn_entity::course::lesson::{self, Model as LessonModel};
use edulearn_entity::course::lesson_progress::{self, Entity as LessonProgress, Model as ProgressModel, Status};
use edulearn_entity::course::enrollment;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<ProgressModel>, DbErr> {
        LessonProgress::find()
            .filter(lesson_progress::Column::EnrollmentId.eq(enrollment_id))
            .filter(lesson_progress::Column::LessonId.eq(lesson_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load lesson progress"))
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ProgressModel>, DbErr> {
        LessonProgress::find_by_id(id)
            .inner_join(enrollment::Entity)
            .filter(enrollment::Column::UserId.eq(user_id))
            .one(conn)
            .await
    }

    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<ProgressModel>, DbErr> {
        LessonProgress::find()
            .inner_join(enrollment::Entity)
            .filter(enrollment::Column::UserId.eq(user_id))
            .order_by_desc(lesson_progress::Column::LastAccessedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list lesson progress"))
    }

    /// Progress rows of an enrollment with their lesson, in lesson order.
    pub async fn list_for_enrollment<C: ConnectionTrait>(
        conn: &C,
        enrollment_id: Uuid,
    ) -> Result<Vec<(ProgressModel, LessonModel)>, DbErr> {
        let rows = LessonProgress::find()
            .filter(lesson_progress::Column::EnrollmentId.eq(enrollment_id))
            .find_also_related(lesson::Entity)
            .order_by_asc(lesson::Column::Position)
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|(progress, lesson)| lesson.map(|lesson| (progress, lesson)))
            .collect())
    }

    pub async fn count_completed_published<C: ConnectionTrait>(conn: &C, enrollment_id: Uuid) -> Result<u64, DbErr> {
        LessonProgress::find()
            .inner_join(lesson::Entity)
            .filter(lesson_progress::Column::EnrollmentId.eq(enrollment_id))
            .filter(lesson_progress::Column::Status.eq(Status::Completed))
            .filter(lesson::Column::IsPublished.eq(true))
            .count(conn)
            .await
    }

    /// The most recently accessed lesson that is still in progress.
    pub async fn latest_in_progress<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
    ) -> Result<Option<(ProgressModel, LessonModel)>, DbErr> {
        let row = LessonProgress::find()
            .inner_join(enrollment::Entity)
            .filter(enrollment::Column::UserId.eq(user_id))
            .filter(lesson_progress::Column::Status.eq(Status::InProgress))
            .order_by_desc(lesson_progress::Column::LastAccessedAt)
            .find_also_related(lesson::Entity)
            .limit(1)
            .one(conn)
            .await?;
        Ok(row.and_then(|(progress, lesson)| lesson.map(|lesson| (progress, lesson))))
    }
}
