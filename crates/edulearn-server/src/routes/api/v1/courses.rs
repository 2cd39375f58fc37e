pub(crate) mod attempts;
pub(crate) mod enrollments;
pub(crate) mod error;
pub(crate) mod lessons;
pub(crate) mod progress;
pub(crate) mod quizzes;

use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::{Router, get, post};
use axum::{Extension, Json};
use edulearn_core::slug::{slugify, unique_slug};
use edulearn_db::course::{category, course, enrollment, lesson};
use edulearn_db::sea_orm::ActiveValue::Set;
use edulearn_db::sea_orm::{DatabaseConnection, DbErr};
use edulearn_db::user;
use edulearn_entity::course::course::{ActiveModel as CourseActiveModel, Model as CourseModel};
use edulearn_entity::user::Model as UserModel;
use edulearn_model::course::{
    Category, CourseChanges, CourseDetail, CourseListItem, Enrollment, EnrollmentStatus, Level, NewCategory,
    NewCourse,
};
use edulearn_model_tools::convert::course::{CourseDetailSource, CourseListing};
use edulearn_model_tools::convert::{FromDbModel, IntoDbModel, IntoModel};
use edulearn_worker::Task;
use http::StatusCode;
use protect_axum::protect;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tokio::try_join;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{slug}", get(get_category))
        .route("/my_courses", get(my_courses))
        .route("/teaching", get(teaching))
        .merge(enrollments::create_router())
        .merge(progress::create_router())
        .merge(attempts::create_router())
        .merge(quizzes::create_router())
        .route(
            "/{slug}",
            get(get_course).put(update_course).patch(update_course).delete(delete_course),
        )
        .route("/{slug}/enroll", post(enroll))
        .merge(lessons::create_router())
        .with_state(())
}

/// Published courses are visible to everyone, drafts only to their instructor.
pub(crate) fn is_visible(course: &CourseModel, viewer: Option<&UserModel>) -> bool {
    course.is_published || viewer.is_some_and(|viewer| viewer.id == course.instructor_id)
}

pub(crate) fn ensure_instructor(course: &CourseModel, user: &UserModel) -> Result<(), CourseError> {
    if course.instructor_id == user.id {
        Ok(())
    } else {
        tracing::debug!(course = %course.id, user = %user.id, "caller is not the instructor");
        Err(CourseError::Forbidden)
    }
}

pub(crate) async fn find_visible_course(
    conn: &DatabaseConnection,
    slug: &str,
    viewer: Option<&UserModel>,
) -> Result<CourseModel, CourseError> {
    course::Query::find_by_slug(conn, slug)
        .await?
        .filter(|found| is_visible(found, viewer))
        .ok_or(CourseError::NotFound)
}

async fn with_lesson_counts(
    conn: &DatabaseConnection,
    courses: Vec<CourseModel>,
) -> Result<Vec<(CourseModel, u64)>, DbErr> {
    let counts = course::Query::lesson_counts(conn, courses.iter().map(|found| found.id).collect()).await?;
    Ok(courses
        .into_iter()
        .map(|found| {
            let count = counts.get(&found.id).copied().unwrap_or_default();
            (found, count)
        })
        .collect())
}

/// Resolves instructor and category names of listed courses.
async fn list_items(
    conn: &DatabaseConnection,
    courses: Vec<(CourseModel, u64)>,
) -> Result<Vec<CourseListItem>, DbErr> {
    let instructor_ids = courses.iter().map(|(found, _)| found.instructor_id).collect();
    let (instructors, categories) = try_join!(
        user::Query::find_users_by_ids(conn, instructor_ids),
        category::Query::list(conn),
    )?;
    let instructors: HashMap<Uuid, String> = instructors
        .into_iter()
        .map(|instructor| (instructor.id, instructor.full_name()))
        .collect();
    let categories: HashMap<Uuid, String> = categories
        .into_iter()
        .map(|category| (category.id, category.name))
        .collect();

    Ok(courses
        .into_iter()
        .map(|(found, lesson_count)| {
            CourseListing {
                instructor_name: instructors.get(&found.instructor_id).cloned().unwrap_or_default(),
                category_name: found.category_id.and_then(|id| categories.get(&id).cloned()),
                course: found,
                lesson_count,
            }
            .into_model()
        })
        .collect())
}

async fn course_detail(
    conn: &DatabaseConnection,
    found: CourseModel,
    viewer: Option<&UserModel>,
) -> Result<CourseDetail, CourseError> {
    let is_instructor = viewer.is_some_and(|viewer| viewer.id == found.instructor_id);
    let category_lookup = async {
        match found.category_id {
            Some(id) => category::Query::find_by_id(conn, id).await,
            None => Ok(None),
        }
    };
    let enrollment_lookup = async {
        match viewer {
            Some(viewer) => enrollment::Query::find(conn, viewer.id, found.id).await,
            None => Ok(None),
        }
    };
    let (category, instructor, lessons, counts, enrolled) = try_join!(
        category_lookup,
        user::Query::find_user_by_id(conn, found.instructor_id),
        lesson::Query::list_for_course(conn, found.id, !is_instructor),
        course::Query::enrollment_counts(conn, vec![found.id]),
        enrollment_lookup,
    )?;
    let instructor = instructor.ok_or(CourseError::NotFound)?;

    Ok(CourseDetail::from_db_model(CourseDetailSource {
        enrollment_count: counts.get(&found.id).copied().unwrap_or_default(),
        is_enrolled: enrolled.is_some(),
        lessons: lessons.into_iter().map(IntoModel::into_model).collect(),
        category,
        instructor,
        course: found,
    }))
}

async fn resolve_category(conn: &DatabaseConnection, slug: Option<&str>) -> Result<Option<Uuid>, CourseError> {
    let Some(slug) = slug.map(str::trim).filter(|slug| !slug.is_empty()) else {
        return Ok(None);
    };
    match category::Query::find_by_slug(conn, slug).await? {
        Some(found) => Ok(Some(found.id)),
        None => Err(ValidationErrors::field("category", format!("Object with slug={slug} does not exist.")).into()),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CourseFilterParams {
    pub category: Option<String>,
    pub level: Option<Level>,
    pub is_featured: Option<bool>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(
        ("category" = Option<String>, Query, description = "category slug"),
        ("level" = Option<Level>, Query, description = "course level"),
        ("is_featured" = Option<bool>, Query, description = "only (not) featured courses"),
        ("search" = Option<String>, Query, description = "case insensitive match on title and descriptions"),
        ("ordering" = Option<String>, Query, description = "created_at, title or lesson_count, prefixed with - for descending order"),
    ),
    responses(
        (status = OK, description = "Published courses and the caller's own drafts", body = [CourseListItem]),
        (status = BAD_REQUEST, description = "Unknown ordering"),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn list_courses(
    viewer: Option<ExtractUser>,
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<CourseFilterParams>,
) -> Result<impl IntoResponse, CourseError> {
    let ordering = match params.ordering.as_deref() {
        Some(ordering) => ordering
            .parse()
            .map_err(|error: String| ValidationErrors::field("ordering", error))?,
        None => course::CourseOrdering::default(),
    };
    let category_id = match params.category.as_deref() {
        Some(slug) => match category::Query::find_by_slug(&conn, slug).await? {
            Some(found) => Some(found.id),
            None => return Ok(Json(Vec::<CourseListItem>::new())),
        },
        None => None,
    };
    let filter = course::CourseFilter {
        category_id,
        level: params.level.map(IntoDbModel::into_db_model),
        is_featured: params.is_featured,
        search: params.search,
        viewer_id: viewer.map(|ExtractUser(viewer)| viewer.id),
    };

    let courses = course::Query::list(&conn, &filter, ordering).await?;
    Ok(Json(list_items(&conn, courses).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses",
    request_body = NewCourse,
    responses(
        (status = CREATED, description = "Created course, the caller is its instructor", body = CourseDetail),
        (status = BAD_REQUEST, description = "Invalid course data"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(new_course): Json<NewCourse>,
) -> Result<impl IntoResponse, CourseError> {
    let mut errors = ValidationErrors::new();
    if new_course.title.trim().is_empty() {
        errors.add("title", "This field may not be blank.");
    }
    if new_course.description.trim().is_empty() {
        errors.add("description", "This field may not be blank.");
    }
    errors.check()?;

    let category_id = resolve_category(&conn, new_course.category.as_deref()).await?;
    let slug = unique_slug(&new_course.title, |slug| {
        let conn = &conn;
        async move { course::Query::slug_exists(conn, &slug).await }
    })
    .await?;

    let created = course::Mutation::create(
        &conn,
        CourseActiveModel {
            title: Set(new_course.title.trim().to_owned()),
            slug: Set(slug),
            description: Set(new_course.description),
            short_description: Set(new_course.short_description),
            category_id: Set(category_id),
            instructor_id: Set(user.id),
            level: Set(new_course.level.into_db_model()),
            duration: Set(new_course.duration),
            prerequisites: Set(new_course.prerequisites),
            learning_objectives: Set(json!(new_course.learning_objectives)),
            thumbnail: Set(new_course.thumbnail),
            preview_video: Set(new_course.preview_video),
            is_published: Set(new_course.is_published),
            is_featured: Set(new_course.is_featured),
            ..Default::default()
        },
    )
    .await?;
    tracing::info!(course = %created.id, slug = created.slug, instructor = %user.id, "created course");
    app_config.tasks().enqueue(Task::UpdateCourseEmbedding(created.id));

    let detail = course_detail(&conn, created, Some(&user)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{slug}",
    params(("slug" = String, Path, description = "course slug")),
    responses(
        (status = OK, description = "Course with lessons", body = CourseDetail),
        (status = NOT_FOUND, description = "Unknown course or a draft of another instructor"),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn get_course(
    viewer: Option<ExtractUser>,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let viewer = viewer.map(|ExtractUser(viewer)| viewer);
    let found = find_visible_course(&conn, &slug, viewer.as_ref()).await?;
    Ok(Json(course_detail(&conn, found, viewer.as_ref()).await?))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/courses/{slug}",
    params(("slug" = String, Path, description = "course slug")),
    request_body = CourseChanges,
    responses(
        (status = OK, description = "Updated course", body = CourseDetail),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(slug): Path<String>,
    Json(changes): Json<CourseChanges>,
) -> Result<impl IntoResponse, CourseError> {
    let found = find_visible_course(&conn, &slug, Some(&user)).await?;
    ensure_instructor(&found, &user)?;

    let mut model: CourseActiveModel = found.into();
    if let Some(title) = changes.title {
        if title.trim().is_empty() {
            return Err(ValidationErrors::field("title", "This field may not be blank.").into());
        }
        model.title = Set(title.trim().to_owned());
    }
    if let Some(description) = changes.description {
        model.description = Set(description);
    }
    if let Some(short_description) = changes.short_description {
        model.short_description = Set(short_description);
    }
    if changes.category.is_some() {
        model.category_id = Set(resolve_category(&conn, changes.category.as_deref()).await?);
    }
    if let Some(level) = changes.level {
        model.level = Set(level.into_db_model());
    }
    if let Some(duration) = changes.duration {
        model.duration = Set(duration);
    }
    if let Some(prerequisites) = changes.prerequisites {
        model.prerequisites = Set(prerequisites);
    }
    if let Some(learning_objectives) = changes.learning_objectives {
        model.learning_objectives = Set(json!(learning_objectives));
    }
    if let Some(thumbnail) = changes.thumbnail {
        model.thumbnail = Set(Some(thumbnail));
    }
    if let Some(preview_video) = changes.preview_video {
        model.preview_video = Set(Some(preview_video));
    }
    if let Some(is_published) = changes.is_published {
        model.is_published = Set(is_published);
    }
    if let Some(is_featured) = changes.is_featured {
        model.is_featured = Set(is_featured);
    }

    let updated = course::Mutation::update(&conn, model).await?;
    app_config.tasks().enqueue(Task::UpdateCourseEmbedding(updated.id));
    Ok(Json(course_detail(&conn, updated, Some(&user)).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{slug}",
    params(("slug" = String, Path, description = "course slug")),
    responses(
        (status = NO_CONTENT, description = "Course deleted with its lessons and enrollments"),
        (status = FORBIDDEN, description = "Caller is not the instructor"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_course(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let found = find_visible_course(&conn, &slug, Some(&user)).await?;
    ensure_instructor(&found, &user)?;
    course::Mutation::delete(&conn, found.id).await?;
    tracing::info!(course = %found.id, "deleted course");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/{slug}/enroll",
    params(("slug" = String, Path, description = "course slug")),
    responses(
        (status = CREATED, description = "New enrollment", body = Enrollment),
        (status = BAD_REQUEST, description = "Already enrolled"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn enroll(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let found = find_visible_course(&conn, &slug, Some(&user)).await?;
    let created = enroll_user(&conn, &user, &found).await?;
    Ok((StatusCode::CREATED, Json(Enrollment::from_db_model((created, found)))))
}

pub(crate) async fn enroll_user(
    conn: &DatabaseConnection,
    user: &UserModel,
    found: &CourseModel,
) -> Result<edulearn_entity::course::enrollment::Model, CourseError> {
    if enrollment::Query::find(conn, user.id, found.id).await?.is_some() {
        return Err(CourseError::AlreadyEnrolled);
    }
    let created = enrollment::Mutation::enroll(conn, user.id, found.id).await?;
    tracing::info!(user = %user.id, course = %found.id, "enrolled");
    Ok(created)
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentFilter {
    pub status: Option<EnrollmentStatus>,
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/my_courses",
    params(("status" = Option<EnrollmentStatus>, Query, description = "only enrollments with this status")),
    responses(
        (status = OK, description = "Courses the caller is enrolled in", body = [CourseListItem]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn my_courses(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<impl IntoResponse, CourseError> {
    let status = filter.status.map(IntoDbModel::into_db_model);
    let courses = enrollment::Query::list_with_courses(&conn, user.id, status, None)
        .await?
        .into_iter()
        .map(|(_, found)| found)
        .collect();
    let courses = with_lesson_counts(&conn, courses).await?;
    Ok(Json(list_items(&conn, courses).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/teaching",
    responses(
        (status = OK, description = "Courses the caller instructs, drafts included", body = [CourseListItem]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn teaching(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, CourseError> {
    let courses = course::Query::list_taught_by(&conn, user.id).await?;
    let courses = with_lesson_counts(&conn, courses).await?;
    Ok(Json(list_items(&conn, courses).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/categories",
    responses(
        (status = OK, description = "All categories", body = [Category]),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn list_categories(
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, CourseError> {
    let categories = category::Query::list(&conn)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect::<Vec<Category>>();
    Ok(Json(categories))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/categories/{slug}",
    params(("slug" = String, Path, description = "category slug")),
    responses(
        (status = OK, description = "A single category", body = Category),
        (status = NOT_FOUND, description = "Unknown category"),
    ),
    tag = "v1/courses",
)]
pub(crate) async fn get_category(
    Extension(conn): Extension<DatabaseConnection>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, CourseError> {
    let found = category::Query::find_by_slug(&conn, &slug)
        .await?
        .ok_or(CourseError::NotFound)?;
    Ok(Json(Category::from_db_model(found)))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/categories",
    request_body = NewCategory,
    responses(
        (status = CREATED, description = "Created category", body = Category),
        (status = BAD_REQUEST, description = "Blank name or slug already taken"),
        (status = FORBIDDEN, description = "Only staff may create categories"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Staff", ty = "Permission")]
pub(crate) async fn create_category(
    Extension(conn): Extension<DatabaseConnection>,
    Json(new_category): Json<NewCategory>,
) -> Result<impl IntoResponse, CourseError> {
    if new_category.name.trim().is_empty() {
        return Err(ValidationErrors::field("name", "This field may not be blank.").into());
    }
    let slug = match new_category.slug.as_deref().map(slugify).filter(|slug| !slug.is_empty()) {
        Some(slug) => {
            if category::Query::find_by_slug(&conn, &slug).await?.is_some() {
                return Err(ValidationErrors::field("slug", "category with this slug already exists.").into());
            }
            slug
        }
        None => {
            unique_slug(&new_category.name, |slug| {
                let conn = &conn;
                async move { Ok::<_, DbErr>(category::Query::find_by_slug(conn, &slug).await?.is_some()) }
            })
            .await?
        }
    };
    if let Some(parent) = new_category.parent {
        if category::Query::find_by_id(&conn, parent).await?.is_none() {
            return Err(ValidationErrors::field("parent", "Invalid parent category.").into());
        }
    }

    let created = category::Mutation::create(
        &conn,
        new_category.name.trim().to_owned(),
        slug,
        new_category.description,
        new_category.parent,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(Category::from_db_model(created))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_db::course::{enrollment, progress};
    use edulearn_db::sea_orm::ActiveValue::Set;
    use edulearn_db::sea_orm::{ActiveModelTrait, IntoActiveModel};
    use edulearn_entity::course::enrollment::Status;
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_user};
    use edulearn_worker::Task;
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_enroll_twice_is_rejected() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "lecturer").await.unwrap();
        let student = create_user(&app.conn, "student").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Rust Basics", true).await.unwrap();
        create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        create_lesson(&app.conn, course.id, 2, true).await.unwrap();
        create_lesson(&app.conn, course.id, 3, false).await.unwrap();
        let token = bearer(&app, student.id);

        let (status, body) = app
            .request(Method::POST, "/api/v1/courses/rust-basics/enroll", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "active");
        assert_eq!(body["progress"], 0.0);

        let created = enrollment::Query::find(&app.conn, student.id, course.id)
            .await
            .unwrap()
            .unwrap();
        let rows = progress::Query::list_for_enrollment(&app.conn, created.id).await.unwrap();
        assert_eq!(rows.len(), 2);

        let (status, body) = app
            .request(Method::POST, "/api/v1/courses/rust-basics/enroll", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "You are already enrolled in this course.");
    }

    #[test(tokio::test)]
    async fn test_list_hides_foreign_drafts() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "author").await.unwrap();
        let other = create_user(&app.conn, "visitor").await.unwrap();
        let published = create_course(&app.conn, instructor.id, "Published", true).await.unwrap();
        create_course(&app.conn, instructor.id, "Draft", false).await.unwrap();
        create_lesson(&app.conn, published.id, 1, true).await.unwrap();
        create_lesson(&app.conn, published.id, 2, true).await.unwrap();

        let (status, body) = app.request(Method::GET, "/api/v1/courses", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let courses = body.as_array().unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0]["lesson_count"], 2);
        assert_eq!(courses[0]["instructor_name"], "author Tester");

        let (_, body) = app
            .request(Method::GET, "/api/v1/courses", Some(&bearer(&app, instructor.id)), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = app
            .request(Method::GET, "/api/v1/courses/draft", Some(&bearer(&app, other.id)), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .request(Method::GET, "/api/v1/courses?ordering=popularity", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app
            .request(Method::GET, "/api/v1/courses?search=PUBLISH&ordering=-lesson_count", None, None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[test(tokio::test)]
    async fn test_create_and_update_course() {
        let mut app = TestApp::new().await;
        let instructor = create_user(&app.conn, "creator").await.unwrap();
        let other = create_user(&app.conn, "meddler").await.unwrap();
        create_course(&app.conn, other.id, "Intro to Rust", true).await.unwrap();
        let token = bearer(&app, instructor.id);

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/courses",
                Some(&token),
                Some(json!({
                    "title": "Intro to Rust",
                    "description": "Ownership and borrowing",
                    "level": "beginner",
                    "learning_objectives": ["borrowck"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["slug"], "intro-to-rust-1");
        assert_eq!(body["instructor"], json!(instructor.id));
        assert_eq!(body["is_enrolled"], false);
        let course_id = serde_json::from_value(body["id"].clone()).unwrap();
        assert_eq!(app.tasks.try_recv().unwrap(), Task::UpdateCourseEmbedding(course_id));

        let (status, _) = app
            .request(
                Method::PATCH,
                "/api/v1/courses/intro-to-rust-1",
                Some(&bearer(&app, other.id)),
                Some(json!({"title": "Mine now"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .request(
                Method::PATCH,
                "/api/v1/courses/intro-to-rust-1",
                Some(&token),
                Some(json!({"is_published": true, "level": "advanced"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["level"], "advanced");
        assert_eq!(body["is_published"], true);

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/courses",
                Some(&token),
                Some(json!({"title": "Bad", "description": "x", "level": "beginner", "category": "missing"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("category").is_some());
    }

    #[test(tokio::test)]
    async fn test_my_courses_and_teaching() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "prof").await.unwrap();
        let student = create_user(&app.conn, "pupil").await.unwrap();
        let first = create_course(&app.conn, instructor.id, "First", true).await.unwrap();
        let second = create_course(&app.conn, instructor.id, "Second", true).await.unwrap();
        enrollment::Mutation::enroll(&app.conn, student.id, first.id).await.unwrap();
        let dropped = enrollment::Mutation::enroll(&app.conn, student.id, second.id).await.unwrap();
        enrollment::Mutation::update_status(&app.conn, dropped.id, Status::Dropped)
            .await
            .unwrap();

        let token = bearer(&app, student.id);
        let (_, body) = app
            .request(Method::GET, "/api/v1/courses/my_courses", Some(&token), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        let (_, body) = app
            .request(Method::GET, "/api/v1/courses/my_courses?status=dropped", Some(&token), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["slug"], "second");

        let (_, body) = app
            .request(Method::GET, "/api/v1/courses/teaching", Some(&bearer(&app, instructor.id)), None)
            .await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        let (status, _) = app.request(Method::GET, "/api/v1/courses/teaching", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[test(tokio::test)]
    async fn test_categories() {
        let app = TestApp::new().await;
        let student = create_user(&app.conn, "plain").await.unwrap();
        let mut staff = create_user(&app.conn, "staff").await.unwrap().into_active_model();
        staff.is_staff = Set(true);
        let staff = staff.update(&app.conn).await.unwrap();

        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/courses/categories",
                Some(&bearer(&app, student.id)),
                Some(json!({"name": "Programming"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/courses/categories",
                Some(&bearer(&app, staff.id)),
                Some(json!({"name": "Systems Programming"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["slug"], "systems-programming");

        let (status, body) = app
            .request(Method::GET, "/api/v1/courses/categories/systems-programming", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Systems Programming");

        let (_, body) = app.request(Method::GET, "/api/v1/courses/categories", None, None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
