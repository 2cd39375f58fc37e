use crate::permissions::Permission;
use crate::routes::api::v1::courses::error::CourseError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_core::course::progress::update_progress;
use edulearn_db::course::{lesson, progress};
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::course::lesson::Model as LessonModel;
use edulearn_entity::course::lesson_progress::Model as ProgressModel;
use edulearn_model::course::{LessonProgress, ProgressChanges};
use edulearn_model_tools::convert::{FromDbModel, IntoDbModel};
use protect_axum::protect;
use std::collections::HashMap;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/progress", get(list_progress)).route(
        "/progress/{id}",
        get(get_progress).put(update_lesson_progress).patch(update_lesson_progress),
    )
}

async fn find_own(
    conn: &DatabaseConnection,
    id: Uuid,
    user_id: Uuid,
) -> Result<(ProgressModel, LessonModel), CourseError> {
    let found = progress::Query::find_for_user(conn, id, user_id)
        .await?
        .ok_or(CourseError::NotFound)?;
    let lesson = lesson::Query::find_by_id(conn, found.lesson_id)
        .await?
        .ok_or(CourseError::NotFound)?;
    Ok((found, lesson))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/progress",
    responses(
        (status = OK, description = "Lesson progress of the caller, most recently accessed first", body = [LessonProgress]),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_progress(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, CourseError> {
    let rows = progress::Query::list_for_user(&conn, user.id).await?;
    let lesson_ids = rows.iter().map(|row| row.lesson_id).collect();
    let lessons: HashMap<Uuid, LessonModel> = lesson::Query::find_by_ids(&conn, lesson_ids)
        .await?
        .into_iter()
        .map(|found| (found.id, found))
        .collect();

    let listed: Vec<LessonProgress> = rows
        .into_iter()
        .filter_map(|row| {
            let found = lessons.get(&row.lesson_id)?.clone();
            Some(LessonProgress::from_db_model((row, found)))
        })
        .collect();
    Ok(Json(listed))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/progress/{id}",
    params(("id" = Uuid, Path, description = "lesson progress id")),
    responses(
        (status = OK, description = "Progress on a single lesson", body = LessonProgress),
        (status = NOT_FOUND, description = "Unknown progress or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_progress(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CourseError> {
    Ok(Json(LessonProgress::from_db_model(find_own(&conn, id, user.id).await?)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/courses/progress/{id}",
    params(("id" = Uuid, Path, description = "lesson progress id")),
    request_body = ProgressChanges,
    responses(
        (status = OK, description = "Updated progress, the enrollment progress is recomputed", body = LessonProgress),
        (status = BAD_REQUEST, description = "Negative time spent"),
        (status = NOT_FOUND, description = "Unknown progress or owned by someone else"),
    ),
    tag = "v1/courses",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_lesson_progress(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
    Json(changes): Json<ProgressChanges>,
) -> Result<impl IntoResponse, CourseError> {
    if changes.time_spent.is_some_and(|time_spent| time_spent < 0) {
        return Err(ValidationErrors::field("time_spent", "Ensure this value is greater than or equal to 0.").into());
    }
    let (found, lesson) = find_own(&conn, id, user.id).await?;
    let (updated, enrollment) = update_progress(
        &conn,
        &found,
        changes.status.map(IntoDbModel::into_db_model),
        changes.time_spent,
    )
    .await?;
    tracing::debug!(enrollment = %enrollment.id, progress = enrollment.progress, "lesson progress updated");
    Ok(Json(LessonProgress::from_db_model((updated, lesson))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_db::course::enrollment;
    use edulearn_test_helpers::fixtures::{create_course, create_lesson, create_user};
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_progress_updates_enrollment() {
        let app = TestApp::new().await;
        let instructor = create_user(&app.conn, "mentor").await.unwrap();
        let student = create_user(&app.conn, "apprentice").await.unwrap();
        let course = create_course(&app.conn, instructor.id, "Pinning", true).await.unwrap();
        create_lesson(&app.conn, course.id, 1, true).await.unwrap();
        create_lesson(&app.conn, course.id, 2, true).await.unwrap();
        let created = enrollment::Mutation::enroll(&app.conn, student.id, course.id).await.unwrap();
        let token = bearer(&app, student.id);

        let (status, rows) = app.request(Method::GET, "/api/v1/courses/progress", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows.as_array().unwrap().len(), 2);
        assert_eq!(rows[0]["status"], "not_started");
        let uri = format!("/api/v1/courses/progress/{}", rows[0]["id"].as_str().unwrap());

        let (status, _) = app
            .request(Method::PATCH, &uri, Some(&token), Some(json!({"time_spent": -1})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, started) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({"status": "in_progress", "time_spent": 90})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(started["time_spent"], 90);
        assert!(started["started_at"].is_string());
        assert!(started["completed_at"].is_null());

        let (_, done) = app
            .request(Method::PUT, &uri, Some(&token), Some(json!({"status": "completed"})))
            .await;
        assert!(done["completed_at"].is_string());

        let refreshed = enrollment::Query::find_by_id(&app.conn, created.id).await.unwrap().unwrap();
        assert_eq!(refreshed.progress, 50.0);

        let outsider = create_user(&app.conn, "outsider").await.unwrap();
        let (status, _) = app
            .request(Method::GET, &uri, Some(&bearer(&app, outsider.id)), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
