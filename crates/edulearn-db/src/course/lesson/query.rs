use edulearn_entity::course::lesson::{self, Entity as Lesson, Model as LessonModel};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use std::error::Error;
use uuid::Uuid;

pub struct Query;

impl Query {
    /// Ordered by position.
    pub async fn list_for_course<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
        published_only: bool,
    ) -> Result<Vec<LessonModel>, DbErr> {
        let mut query = Lesson::find().filter(lesson::Column::CourseId.eq(course_id));
        if published_only {
            query = query.filter(lesson::Column::IsPublished.eq(true));
        }
        query
            .order_by_asc(lesson::Column::Position)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list lessons"))
    }

    pub async fn list_for_courses<C: ConnectionTrait>(
        conn: &C,
        course_ids: Vec<Uuid>,
    ) -> Result<Vec<LessonModel>, DbErr> {
        Lesson::find()
            .filter(lesson::Column::CourseId.is_in(course_ids))
            .order_by_asc(lesson::Column::Position)
            .all(conn)
            .await
    }

    pub async fn find_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<LessonModel>, DbErr> {
        Lesson::find().filter(lesson::Column::Id.is_in(ids)).all(conn).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<LessonModel>, DbErr> {
        Lesson::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, %id, "failed to load lesson"))
    }

    pub async fn find_by_slug<C: ConnectionTrait>(
        conn: &C,
        course_id: Uuid,
        slug: &str,
    ) -> Result<Option<LessonModel>, DbErr> {
        Lesson::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .filter(lesson::Column::Slug.eq(slug))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, slug, "failed to load lesson by slug"))
    }

    pub async fn count_published<C: ConnectionTrait>(conn: &C, course_id: Uuid) -> Result<u64, DbErr> {
        Lesson::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .filter(lesson::Column::IsPublished.eq(true))
            .count(conn)
            .await
    }

    pub async fn slug_exists<C: ConnectionTrait>(conn: &C, course_id: Uuid, slug: &str) -> Result<bool, DbErr> {
        let count = Lesson::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .filter(lesson::Column::Slug.eq(slug))
            .count(conn)
            .await?;
        Ok(count > 0)
    }
}
