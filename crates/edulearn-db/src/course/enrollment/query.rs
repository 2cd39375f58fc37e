use edulearn_entity::course::course::{self, Model as CourseModel};
use edulearn_entity::course::enrollment::{self, Entity as Enrollment, Model as EnrollmentModel, Status};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    pub async fn find<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentModel>, DbErr> {
        Enrollment::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to load enrollment"))
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<EnrollmentModel>, DbErr> {
        Enrollment::find_by_id(id).one(conn).await
    }

    pub async fn find_for_user<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<EnrollmentModel>, DbErr> {
        Enrollment::find_by_id(id)
            .filter(enrollment::Column::UserId.eq(user_id))
            .one(conn)
            .await
    }

    /// Enrollments of a user with their course, newest first.
    pub async fn list_with_courses<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        status: Option<Status>,
        course_id: Option<Uuid>,
    ) -> Result<Vec<(EnrollmentModel, CourseModel)>, DbErr> {
        let mut query = Enrollment::find().filter(enrollment::Column::UserId.eq(user_id));
        if let Some(status) = status {
            query = query.filter(enrollment::Column::Status.eq(status));
        }
        if let Some(course_id) = course_id {
            query = query.filter(enrollment::Column::CourseId.eq(course_id));
        }
        let rows = query
            .order_by_desc(enrollment::Column::EnrolledAt)
            .find_also_related(course::Entity)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list enrollments"))?;
        Ok(rows
            .into_iter()
            .filter_map(|(enrollment, course)| course.map(|course| (enrollment, course)))
            .collect())
    }

    pub async fn list_for_user<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<EnrollmentModel>, DbErr> {
        Enrollment::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .all(conn)
            .await
    }

    pub async fn enrolled_course_ids<C: ConnectionTrait>(conn: &C, user_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
        let enrollments = Self::list_for_user(conn, user_id).await?;
        Ok(enrollments.into_iter().map(|enrollment| enrollment.course_id).collect())
    }
}
