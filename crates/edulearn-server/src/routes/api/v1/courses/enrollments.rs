use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::routes::api::v1::courses::{EnrollmentFilter, enroll_user, is_visible};
use crate::user::ExtractUser;
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_db::course::{course, enrollment, progress};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::course::course::Model as CourseModel;
use edulearn_entity::course::enrollment::Model as EnrollmentModel;
use edulearn_model::course::{Enrollment, EnrollmentChanges, EnrollmentStatus, LessonProgress, NewEnrollment};
use edulearn_model_tools::convert::{FromDbModel, IntoDbModel};
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route(
            "/enrollments/{id}",
            get(get_enrollment)
                .put(update_enrollment)
                .patch(update_enrollment)
                .delete(delete_enrollment),
        )
        .route("/enrollments/{id}/progress", get(enrollment_progress))
}

/// An enrollment of `user` with its course, 404 for anyone else's.
async fn find_own(
    conn: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<(EnrollmentModel, CourseModel), CourseError> {
    let found = enrollment::Query::find_for_user(conn, id, user_id)
        .await?
        .ok_or(CourseError::NotFound)?;
    let course = course::Query::find_by_id(conn, found.course_id)
        .await?
        .ok_or(CourseError::NotFound)?;
    Ok((found, course))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/enrollments",
    params(("status" = Option<EnrollmentStatus>, Query, description = "only enrollments with this status")),
    responses(
        (status = OK, description = "Enrollments of the caller, newest first", body = [Enrollment]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_enrollments(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Query(filter): Query<EnrollmentFilter>,
) -> Result<impl IntoResponse, CourseError> {
    let status = filter.status.map(IntoDbModel::into_db_model);
    let enrollments: Vec<Enrollment> = enrollment::Query::list_with_courses(&conn, user.id, status, None)
        .await?
        .into_iter()
        .map(Enrollment::from_db_model)
        .collect();
    Ok(Json(enrollments))
}

#[utoipa::path(
    post,
    path = "/api/v1/courses/enrollments",
    request_body = NewEnrollment,
    responses(
        (status = CREATED, description = "Enrollment with progress rows for the published lessons", body = Enrollment),
        (status = BAD_REQUEST, description = "Already enrolled"),
        (status = NOT_FOUND, description = "Unknown course"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_enrollment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(new_enrollment): Json<NewEnrollment>,
) -> Result<impl IntoResponse, CourseError> {
    let found = course::Query::find_by_id(&conn, new_enrollment.course)
        .await?
        .filter(|found| is_visible(found, Some(&user)))
        .ok_or(CourseError::NotFound)?;
    let created = enroll_user(&conn, &user, &found).await?;
    Ok((StatusCode::CREATED, Json(Enrollment::from_db_model((created, found)))))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/enrollments/{id}",
    params(("id" = Uuid, Path, description = "enrollment id")),
    responses(
        (status = OK, description = "A single enrollment", body = Enrollment),
        (status = NOT_FOUND, description = "Unknown enrollment or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_enrollment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    let found = find_own(&conn, id, user.id).await?;
    Ok(Json(Enrollment::from_db_model(found)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/courses/enrollments/{id}",
    params(("id" = Uuid, Path, description = "enrollment id")),
    request_body = EnrollmentChanges,
    responses(
        (status = OK, description = "Enrollment with the new status", body = Enrollment),
        (status = NOT_FOUND, description = "Unknown enrollment or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_enrollment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
    Json(changes): Json<EnrollmentChanges>,
) -> Result<impl IntoResponse, CourseError> {
    let (found, course) = find_own(&conn, id, user.id).await?;
    let updated = enrollment::Mutation::update_status(&conn, found.id, changes.status.into_db_model()).await?;
    tracing::info!(enrollment = %updated.id, status = %changes.status, "changed enrollment status");
    Ok(Json(Enrollment::from_db_model((updated, course))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/enrollments/{id}",
    params(("id" = Uuid, Path, description = "enrollment id")),
    responses(
        (status = NO_CONTENT, description = "Enrollment and its progress removed"),
        (status = NOT_FOUND, description = "Unknown enrollment or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_enrollment(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    let (found, _) = find_own(&conn, id, user.id).await?;
    enrollment::Mutation::delete(&conn, found.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/enrollments/{id}/progress",
    params(("id" = Uuid, Path, description = "enrollment id")),
    responses(
        (status = OK, description = "Progress per lesson in lesson order", body = [LessonProgress]),
        (status = NOT_FOUND, description = "Unknown enrollment or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn enrollment_progress(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    let (found, _) = find_own(&conn, id, user.id).await?;
    let rows: Vec<LessonProgress> = progress::Query::list_for_enrollment(&conn, found.id)
        .await?
        .into_iter()
        .map(LessonProgress::from_db_model)
        .collect();
    Ok(Json(rows))
}
