use crate::permissions::Permission;
use crate::routes::api::v1::users::error::UserError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_db::activity;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_model::user::{ActivityStats, LearningActivity, NewLearningActivity};
use edulearn_model_tools::convert::{FromDbModel, IntoModel};
use http::StatusCode;
use protect_axum::protect;
use uuid::Uuid;

const RECENT_ACTIVITIES: u64 = 5;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route("/activities/stats", get(activity_stats))
        .route("/activities/{id}", get(get_activity).delete(delete_activity))
        .with_state(())
}

#[utoipa::path(
    get,
    path = "/api/v1/users/activities",
    responses(
        (status = OK, description = "Activities of the signed in user, newest first", body = [LearningActivity]),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_activities(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, UserError> {
    let activities = activity::Query::list_for_user(&conn, user.id, None)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect::<Vec<LearningActivity>>();
    Ok(Json(activities))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/activities",
    request_body = NewLearningActivity,
    responses(
        (status = CREATED, description = "Recorded activity", body = LearningActivity),
        (status = BAD_REQUEST, description = "Missing activity or content type"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_activity(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(new_activity): Json<NewLearningActivity>,
) -> Result<impl IntoResponse, UserError> {
    let mut errors = ValidationErrors::new();
    if new_activity.activity_type.trim().is_empty() {
        errors.add("activity_type", "This field may not be blank.");
    }
    if new_activity.content_type.trim().is_empty() {
        errors.add("content_type", "This field may not be blank.");
    }
    errors.check()?;

    let created = activity::Mutation::create(
        &conn,
        user.id,
        new_activity.activity_type,
        new_activity.content_type,
        new_activity.content_id,
        new_activity.metadata.into(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(LearningActivity::from_db_model(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/activities/stats",
    responses(
        (status = OK, description = "Activity summary of the signed in user", body = ActivityStats),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn activity_stats(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, UserError> {
    let total_activities = activity::Query::count_for_user(&conn, user.id).await?;
    let activity_types = activity::Query::distinct_types_for_user(&conn, user.id).await?;
    let recent_activities = activity::Query::list_for_user(&conn, user.id, Some(RECENT_ACTIVITIES))
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect();
    Ok(Json(ActivityStats {
        total_activities,
        activity_types,
        recent_activities,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/activities/{id}",
    params(("id" = Uuid, Path, description = "activity id")),
    responses(
        (status = OK, description = "A single activity", body = LearningActivity),
        (status = NOT_FOUND, description = "Unknown activity or owned by another user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_activity(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    let found = activity::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(Json(LearningActivity::from_db_model(found)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/activities/{id}",
    params(("id" = Uuid, Path, description = "activity id")),
    responses(
        (status = NO_CONTENT, description = "Activity deleted"),
        (status = NOT_FOUND, description = "Unknown activity or owned by another user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_activity(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    if !activity::Mutation::delete_for_user(&conn, id, user.id).await? {
        return Err(UserError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
