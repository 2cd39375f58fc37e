use crate::course::error::CourseError;
use chrono::Utc;
use edulearn_db::course::{enrollment, lesson, progress};
use edulearn_entity::course::enrollment::{Model as EnrollmentModel, Status as EnrollmentStatus};
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::course::lesson_progress::{ActiveModel, Model as ProgressModel, Status};
use sea_orm::ActiveValue::{Set, Unchanged};
use sea_orm::{ConnectionTrait, DbErr};
use tracing::instrument;
use uuid::Uuid;

/// Completed published lessons over published lessons, as a percentage.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn progress_percentage(completed: u64, published: u64) -> f64 {
    if published == 0 {
        0.0
    } else {
        completed.min(published) as f64 / published as f64 * 100.0
    }
}

/// Stores the recomputed progress of an enrollment and completes it once every published lesson is done.
#[instrument(skip(conn, enrollment), fields(enrollment_id = %enrollment.id))]
pub async fn recompute_enrollment_progress<C: ConnectionTrait>(
    conn: &C,
    enrollment: &EnrollmentModel,
) -> Result<EnrollmentModel, DbErr> {
    let published = lesson::Query::count_published(conn, enrollment.course_id).await?;
    let completed = progress::Query::count_completed_published(conn, enrollment.id).await?;
    let percentage = progress_percentage(completed, published);

    let (status, completed_at) = if published > 0 && completed >= published {
        (
            EnrollmentStatus::Completed,
            enrollment.completed_at.or_else(|| Some(Utc::now().naive_utc())),
        )
    } else {
        (enrollment.status, enrollment.completed_at)
    };
    tracing::debug!(percentage, ?status, "recomputed enrollment progress");
    enrollment::Mutation::update_progress(conn, enrollment.id, percentage, status, completed_at).await
}

/// Applies a status change to a progress row, setting the timestamps the new status implies.
#[must_use]
pub fn apply_status(progress: &ProgressModel, status: Option<Status>, time_spent: Option<i32>) -> ActiveModel {
    let now = Utc::now().naive_utc();
    let mut active = ActiveModel {
        id: Unchanged(progress.id),
        last_accessed_at: Set(now),
        ..Default::default()
    };
    if let Some(time_spent) = time_spent {
        active.time_spent = Set(time_spent.max(0));
    }
    if let Some(status) = status {
        active.status = Set(status);
        match status {
            Status::InProgress => {
                if progress.started_at.is_none() {
                    active.started_at = Set(Some(now));
                }
            }
            Status::Completed => {
                if progress.started_at.is_none() {
                    active.started_at = Set(Some(now));
                }
                active.completed_at = Set(Some(now));
            }
            Status::NotStarted => {}
        }
    }
    active
}

/// Updates a lesson progress row and the progress of its enrollment.
pub async fn update_progress<C: ConnectionTrait>(
    conn: &C,
    current: &ProgressModel,
    status: Option<Status>,
    time_spent: Option<i32>,
) -> Result<(ProgressModel, EnrollmentModel), DbErr> {
    let updated = progress::Mutation::update(conn, apply_status(current, status, time_spent)).await?;
    let enrollment = enrollment::Query::find_by_id(conn, updated.enrollment_id)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("enrollment {}", updated.enrollment_id)))?;
    let enrollment = recompute_enrollment_progress(conn, &enrollment).await?;
    Ok((updated, enrollment))
}

/// Marks a lesson completed for the user and returns the new course progress.
#[instrument(skip(conn, lesson), fields(lesson_id = %lesson.id))]
pub async fn mark_complete<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    lesson: &LessonModel,
) -> Result<(ProgressModel, EnrollmentModel), CourseError> {
    let enrollment = enrollment::Query::find(conn, user_id, lesson.course_id)
        .await?
        .ok_or(CourseError::NotEnrolled)?;
    let current = progress::Mutation::get_or_create(conn, enrollment.id, lesson.id).await?;
    Ok(update_progress(conn, &current, Some(Status::Completed), None).await?)
}
