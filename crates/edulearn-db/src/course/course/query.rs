use crate::util::contains_ignore_case;
use edulearn_entity::course::course::{self, Entity as Course, Level, Model as CourseModel};
use edulearn_entity::course::{enrollment, lesson};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Default, Clone)]
pub struct CourseFilter {
    pub category_id: Option<Uuid>,
    pub level: Option<Level>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    /// Unpublished courses of this instructor are listed as well.
    pub viewer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CourseOrdering {
    #[default]
    NewestFirst,
    OldestFirst,
    TitleAsc,
    TitleDesc,
    LessonCountAsc,
    LessonCountDesc,
}

impl FromStr for CourseOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "-created_at" => Ok(Self::NewestFirst),
            "created_at" => Ok(Self::OldestFirst),
            "title" => Ok(Self::TitleAsc),
            "-title" => Ok(Self::TitleDesc),
            "lesson_count" => Ok(Self::LessonCountAsc),
            "-lesson_count" => Ok(Self::LessonCountDesc),
            other => Err(format!("unknown ordering: {other}")),
        }
    }
}

pub struct Query;

impl Query {
    pub async fn find_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<Option<CourseModel>, DbErr> {
        Course::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, %id, "failed to load course"))
    }

    pub async fn find_by_ids<C: ConnectionTrait>(conn: &C, ids: Vec<Uuid>) -> Result<Vec<CourseModel>, DbErr> {
        Course::find().filter(course::Column::Id.is_in(ids)).all(conn).await
    }

    pub async fn find_by_slug<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<Option<CourseModel>, DbErr> {
        Course::find()
            .filter(course::Column::Slug.eq(slug))
            .one(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, slug, "failed to load course by slug"))
    }

    pub async fn slug_exists<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<bool, DbErr> {
        let count = Course::find().filter(course::Column::Slug.eq(slug)).count(conn).await?;
        Ok(count > 0)
    }

    /// Lists courses together with their lesson count.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &CourseFilter,
        ordering: CourseOrdering,
    ) -> Result<Vec<(CourseModel, u64)>, DbErr> {
        let visibility = match filter.viewer_id {
            Some(viewer_id) => Condition::any()
                .add(course::Column::IsPublished.eq(true))
                .add(course::Column::InstructorId.eq(viewer_id)),
            None => Condition::all().add(course::Column::IsPublished.eq(true)),
        };
        let mut query = Course::find().filter(visibility);

        if let Some(category_id) = filter.category_id {
            query = query.filter(course::Column::CategoryId.eq(category_id));
        }
        if let Some(level) = filter.level {
            query = query.filter(course::Column::Level.eq(level));
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(course::Column::IsFeatured.eq(is_featured));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(contains_ignore_case((Course, course::Column::Title), search))
                    .add(contains_ignore_case((Course, course::Column::Description), search))
                    .add(contains_ignore_case((Course, course::Column::ShortDescription), search)),
            );
        }

        query = match ordering {
            CourseOrdering::OldestFirst => query.order_by_asc(course::Column::CreatedAt),
            CourseOrdering::TitleAsc => query.order_by_asc(course::Column::Title),
            CourseOrdering::TitleDesc => query.order_by_desc(course::Column::Title),
            CourseOrdering::NewestFirst | CourseOrdering::LessonCountAsc | CourseOrdering::LessonCountDesc => {
                query.order_by_desc(course::Column::CreatedAt)
            }
        };

        let courses = query
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list courses"))?;

        let counts = Self::lesson_counts(conn, courses.iter().map(|course| course.id).collect()).await?;
        let mut courses: Vec<_> = courses
            .into_iter()
            .map(|course| {
                let count = counts.get(&course.id).copied().unwrap_or_default();
                (course, count)
            })
            .collect();

        match ordering {
            CourseOrdering::LessonCountAsc => courses.sort_by_key(|(_, count)| *count),
            CourseOrdering::LessonCountDesc => courses.sort_by(|(_, a), (_, b)| b.cmp(a)),
            _ => {}
        }
        Ok(courses)
    }

    pub async fn lesson_counts<C: ConnectionTrait>(conn: &C, course_ids: Vec<Uuid>) -> Result<HashMap<Uuid, u64>, DbErr> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = lesson::Entity::find()
            .select_only()
            .column(lesson::Column::CourseId)
            .column_as(Expr::col(lesson::Column::Id).count(), "lesson_count")
            .filter(lesson::Column::CourseId.is_in(course_ids))
            .group_by(lesson::Column::CourseId)
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    pub async fn enrollment_counts<C: ConnectionTrait>(
        conn: &C,
        course_ids: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, u64>, DbErr> {
        if course_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, i64)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .column_as(Expr::col(enrollment::Column::Id).count(), "enrollment_count")
            .filter(enrollment::Column::CourseId.is_in(course_ids))
            .group_by(enrollment::Column::CourseId)
            .into_tuple()
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or_default()))
            .collect())
    }

    pub async fn list_taught_by<C: ConnectionTrait>(conn: &C, instructor_id: Uuid) -> Result<Vec<CourseModel>, DbErr> {
        Course::find()
            .filter(course::Column::InstructorId.eq(instructor_id))
            .order_by_desc(course::Column::CreatedAt)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to list taught courses"))
    }

    pub async fn list_published<C: ConnectionTrait>(conn: &C) -> Result<Vec<CourseModel>, DbErr> {
        Course::find()
            .filter(course::Column::IsPublished.eq(true))
            .order_by_desc(course::Column::CreatedAt)
            .all(conn)
            .await
    }

    pub async fn search_published_by_title<C: ConnectionTrait>(
        conn: &C,
        term: &str,
        limit: u64,
    ) -> Result<Vec<CourseModel>, DbErr> {
        Course::find()
            .filter(course::Column::IsPublished.eq(true))
            .filter(contains_ignore_case((Course, course::Column::Title), term))
            .order_by_asc(course::Column::Title)
            .limit(limit)
            .all(conn)
            .await
            .inspect_err(|error| tracing::error!(error = error as &dyn Error, "failed to search courses"))
    }

    /// Published courses ordered by enrollment count, most popular first.
    pub async fn most_enrolled_published<C: ConnectionTrait>(
        conn: &C,
        exclude: &[Uuid],
        limit: usize,
    ) -> Result<Vec<CourseModel>, DbErr> {
        let courses: Vec<_> = Self::list_published(conn)
            .await?
            .into_iter()
            .filter(|course| !exclude.contains(&course.id))
            .collect();
        let counts = Self::enrollment_counts(conn, courses.iter().map(|course| course.id).collect()).await?;
        let mut courses: Vec<_> = courses
            .into_iter()
            .map(|course| (counts.get(&course.id).copied().unwrap_or_default(), course))
            .collect();
        courses.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(courses.into_iter().take(limit).map(|(_, course)| course).collect())
    }
}
