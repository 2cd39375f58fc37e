use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::routes::api::v1::courses::{ensure_instructor, find_visible_course};
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use edulearn_core::course::progress::mark_complete;
use edulearn_core::slug::{slugify, unique_slug};
use edulearn_db::course::{enrollment, lesson};
use edulearn_db::sea_orm::ActiveValue::Set;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_entity::course::lesson::{ActiveModel as LessonActiveModel, Model as LessonModel};
use edulearn_entity::user::Model as UserModel;
use edulearn_model::course::{Lesson, LessonChanges, MarkComplete, NewLesson};
use edulearn_model_tools::convert::{FromDbModel, IntoModel};
use http::StatusCode;
use protect_axum::protect;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/{slug}/lessons", get(list_lessons).post(create_lesson))
        .route(
            "/{slug}/lessons/{lesson_slug}",
            get(get_lesson)
                .put(update_lesson)
                .patch(update_lesson)
                .delete(delete_lesson),
        )
        .route("/{slug}/lessons/{lesson_slug}/mark_complete", post(complete_lesson))
        .with_state(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LessonAccess {
    /// Drafts included.
    Instructor,
    Enrolled,
    /// Free previews only.
    Visitor,
}

impl LessonAccess {
    pub(crate) async fn resolve(
        conn: &DatabaseConnection,
        course: &CourseModel,
        viewer: Option<&UserModel>,
    ) -> Result<Self, CourseError> {
        let Some(viewer) = viewer else {
            return Ok(Self::Visitor);
        };
        if viewer.id == course.instructor_id {
            return Ok(Self::Instructor);
        }
        if enrollment::Query::find(conn, viewer.id, course.id).await?.is_some() {
            Ok(Self::Enrolled)
        } else {
            Ok(Self::Visitor)
        }
    }

    pub(crate) fn can_view(self, lesson: &LessonModel) -> bool {
        match self {
            Self::Instructor => true,
            Self::Enrolled => lesson.is_published,
            Self::Visitor => lesson.is_published && lesson.is_free_preview,
        }
    }
}

async fn find_lesson(
    conn: &DatabaseConnection,
    course: &CourseModel,
    lesson_slug: &str,
) -> Result<LessonModel, CourseError> {
    lesson::Query::find_by_slug(conn, course.id, lesson_slug)
        .await?
        .ok_or(CourseError::NotFound)
}

fn check_lesson(errors: &mut ValidationErrors, title: Option<&str>, duration: Option<i32>) {
    if title.is_some_and(|title| title.trim().is_empty()) {
        errors.add("title", "This field may not be blank.");
    }
    if duration.is_some_and(|duration| duration < 0) {
        errors.add("duration", "Ensure this value is greater than or equal to 0.");
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}/lessons",
    params(("slug" = String, Path, description = "course slug")),
    responses(
        (status = OK, description = "Lessons visible to the caller, in course order", body = [Lesson]),
        (status = NOT_FOUND, description = "Unknown course"),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn list_lessons(
    viewer: Option<ExtractUser>,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let viewer = viewer.map(|ExtractUser(viewer)| viewer);
    let course = find_visible_course(&conn, &slug, viewer.as_ref()).await?;
    let access = LessonAccess::resolve(&conn, &course, viewer.as_ref()).await?;
    let lessons = lesson::Query::list_for_course(&conn, course.id, access != LessonAccess::Instructor)
        .await?
        .into_iter()
        .filter(|found| access.can_view(found))
        .map(IntoModel::into_model)
        .collect::<Vec<Lesson>>();
    Ok(Json(lessons))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}/lessons/{lesson_slug}",
    params(
        ("slug" = String, Path, description = "course slug"),
        ("lesson_slug" = String, Path, description = "lesson slug, unique within the course"),
    ),
    responses(
        (status = OK, description = "A single lesson", body = Lesson),
        (status = NOT_FOUND, description = "Unknown lesson or not visible to the caller"),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn get_lesson(
    viewer: Option<ExtractUser>,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, lesson_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, CourseError> {
    let viewer = viewer.map(|ExtractUser(viewer)| viewer);
    let course = find_visible_course(&conn, &slug, viewer.as_ref()).await?;
    let found = find_lesson(&conn, &course, &lesson_slug).await?;
    let access = LessonAccess::resolve(&conn, &course, viewer.as_ref()).await?;
    if !access.can_view(&found) {
        return Err(CourseError::NotFound);
    }
    Ok(Json(Lesson::from_db_model(found)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{slug}/lessons",
    params(("slug" = String, Path, description = "course slug")),
    request_body = NewLesson,
    responses(
        (status = CREATED, description = "Created lesson", body = Lesson),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_lesson(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
    Json(new_lesson): Json<NewLesson>,
) -> Result<impl IntoResponse, CourseError> {
    let course = find_visible_course(&conn, &slug, Some(&user)).await?;
    ensure_instructor(&course, &user)?;

    let mut errors = ValidationErrors::new();
    check_lesson(&mut errors, Some(&new_lesson.title), Some(new_lesson.duration));
    errors.check()?;

    let lesson_slug = match new_lesson.slug.as_deref().map(slugify).filter(|slug| !slug.is_empty()) {
        Some(lesson_slug) => {
            if lesson::Query::slug_exists(&conn, course.id, &lesson_slug).await? {
                return Err(ValidationErrors::field("slug", "A lesson with this slug already exists in this course.").into());
            }
            lesson_slug
        }
        None => {
            unique_slug(&new_lesson.title, |candidate| {
                let conn = &conn;
                let course_id = course.id;
                async move { lesson::Query::slug_exists(conn, course_id, &candidate).await }
            })
            .await?
        }
    };

    let created = lesson::Mutation::create(
        &conn,
        course.id,
        LessonActiveModel {
            title: Set(new_lesson.title.trim().to_owned()),
            slug: Set(lesson_slug),
            description: Set(new_lesson.description),
            position: Set(new_lesson.order),
            content: Set(new_lesson.content),
            video_url: Set(new_lesson.video_url),
            duration: Set(new_lesson.duration),
            is_published: Set(new_lesson.is_published),
            is_free_preview: Set(new_lesson.is_free_preview),
            ..Default::default()
        },
    )
    .await?;
    tracing::info!(course = %course.id, lesson = %created.id, "created lesson");
    Ok((StatusCode::CREATED, Json(Lesson::from_db_model(created))))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/courses/{slug}/lessons/{lesson_slug}",
    params(
        ("slug" = String, Path, description = "course slug"),
        ("lesson_slug" = String, Path, description = "lesson slug"),
    ),
    request_body = LessonChanges,
    responses(
        (status = OK, description = "Updated lesson", body = Lesson),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_lesson(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, lesson_slug)): Path<(String, String)>,
    Json(changes): Json<LessonChanges>,
) -> Result<impl IntoResponse, CourseError> {
    let course = find_visible_course(&conn, &slug, Some(&user)).await?;
    ensure_instructor(&course, &user)?;
    let found = find_lesson(&conn, &course, &lesson_slug).await?;

    let mut errors = ValidationErrors::new();
    check_lesson(&mut errors, changes.title.as_deref(), changes.duration);
    errors.check()?;

    let mut model: LessonActiveModel = found.into();
    if let Some(title) = changes.title {
        model.title = Set(title.trim().to_owned());
    }
    if let Some(description) = changes.description {
        model.description = Set(description);
    }
    if let Some(order) = changes.order {
        model.position = Set(order);
    }
    if let Some(content) = changes.content {
        model.content = Set(content);
    }
    if let Some(video_url) = changes.video_url {
        model.video_url = Set(Some(video_url));
    }
    if let Some(duration) = changes.duration {
        model.duration = Set(duration);
    }
    if let Some(is_published) = changes.is_published {
        model.is_published = Set(is_published);
    }
    if let Some(is_free_preview) = changes.is_free_preview {
        model.is_free_preview = Set(is_free_preview);
    }

    let updated = lesson::Mutation::update(&conn, model).await?;
    Ok(Json(Lesson::from_db_model(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{slug}/lessons/{lesson_slug}",
    params(
        ("slug" = String, Path, description = "course slug"),
        ("lesson_slug" = String, Path, description = "lesson slug"),
    ),
    responses(
        (status = NO_CONTENT, description = "Lesson deleted"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_lesson(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, lesson_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = find_visible_course(&conn, &slug, Some(&user)).await?;
    ensure_instructor(&course, &user)?;
    let found = find_lesson(&conn, &course, &lesson_slug).await?;
    lesson::Mutation::delete(&conn, found.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{slug}/lessons/{lesson_slug}/mark_complete",
    params(
        ("slug" = String, Path, description = "course slug"),
        ("lesson_slug" = String, Path, description = "lesson slug"),
    ),
    responses(
        (status = OK, description = "Lesson completed, new course progress", body = MarkComplete),
        (status = BAD_REQUEST, description = "Caller is not enrolled in the course"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn complete_lesson(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path((slug, lesson_slug)): Path<(String, String)>,
) -> Result<impl IntoResponse, CourseError> {
    let course = find_visible_course(&conn, &slug, Some(&user)).await?;
    let found = find_lesson(&conn, &course, &lesson_slug).await?;
    if !found.is_published && course.instructor_id != user.id {
        return Err(CourseError::NotFound);
    }

    let (_, enrollment) = mark_complete(&conn, user.id, &found).await?;
    Ok(Json(MarkComplete {
        detail: "Lesson marked as completed.".to_owned(),
        progress: enrollment.progress,
    }))
}
