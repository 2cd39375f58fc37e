use crate::permissions::Permission;
use crate::routes::api::v1::users::error::UserError;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_db::preference;
use edulearn_db::sea_orm::ActiveValue::Set;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_entity::user_preference::ActiveModel as PreferenceActiveModel;
use edulearn_model::user::{PreferenceChanges, UserPreference};
use edulearn_model_tools::convert::TryFromDbModel;
use http::StatusCode;
use protect_axum::protect;
use serde_json::json;
use uuid::Uuid;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/preferences", get(list_preferences).post(create_preference))
        .route(
            "/preferences/{id}",
            get(get_preference)
                .put(update_preference)
                .patch(update_preference)
                .delete(delete_preference),
        )
        .with_state(())
}

fn apply_changes(model: &mut PreferenceActiveModel, changes: PreferenceChanges) {
    if let Some(preferred_categories) = changes.preferred_categories {
        model.preferred_categories = Set(json!(preferred_categories));
    }
    if let Some(difficulty_preference) = changes.difficulty_preference {
        model.difficulty_preference = Set(difficulty_preference);
    }
    if let Some(learning_pace) = changes.learning_pace {
        model.learning_pace = Set(learning_pace);
    }
    if let Some(notification_settings) = changes.notification_settings {
        model.notification_settings = Set(notification_settings.into());
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/preferences",
    responses(
        (status = OK, description = "Preferences of the signed in user", body = [UserPreference]),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_preferences(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, UserError> {
    let preferences = preference::Query::find_by_user(&conn, user.id)
        .await?
        .map(UserPreference::try_from_db_model)
        .transpose()?
        .into_iter()
        .collect::<Vec<_>>();
    Ok(Json(preferences))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/preferences",
    request_body = PreferenceChanges,
    responses(
        (status = CREATED, description = "Created preferences", body = UserPreference),
        (status = BAD_REQUEST, description = "The user already has preferences"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn create_preference(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Json(changes): Json<PreferenceChanges>,
) -> Result<impl IntoResponse, UserError> {
    if preference::Query::find_by_user(&conn, user.id).await?.is_some() {
        return Err(UserError::PreferenceExists);
    }

    let mut model = PreferenceActiveModel {
        preferred_categories: Set(json!([])),
        difficulty_preference: Set(String::new()),
        learning_pace: Set(String::new()),
        notification_settings: Set(json!({})),
        ..Default::default()
    };
    apply_changes(&mut model, changes);

    let created = preference::Mutation::create(&conn, user.id, model).await?;
    Ok((StatusCode::CREATED, Json(UserPreference::try_from_db_model(created)?)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/preferences/{id}",
    params(("id" = Uuid, Path, description = "preference id")),
    responses(
        (status = OK, description = "A single preference set", body = UserPreference),
        (status = NOT_FOUND, description = "Unknown preference or owned by another user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_preference(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    let found = preference::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(Json(UserPreference::try_from_db_model(found)?))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/users/preferences/{id}",
    params(("id" = Uuid, Path, description = "preference id")),
    request_body = PreferenceChanges,
    responses(
        (status = OK, description = "Updated preferences", body = UserPreference),
        (status = NOT_FOUND, description = "Unknown preference or owned by another user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_preference(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
    Json(changes): Json<PreferenceChanges>,
) -> Result<impl IntoResponse, UserError> {
    let found = preference::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(UserError::NotFound)?;
    let mut model: PreferenceActiveModel = found.into();
    apply_changes(&mut model, changes);
    let updated = preference::Mutation::update(&conn, model).await?;
    Ok(Json(UserPreference::try_from_db_model(updated)?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/preferences/{id}",
    params(("id" = Uuid, Path, description = "preference id")),
    responses(
        (status = NO_CONTENT, description = "Preferences deleted"),
        (status = NOT_FOUND, description = "Unknown preference or owned by another user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_preference(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    preference::Query::find_for_user(&conn, id, user.id)
        .await?
        .ok_or(UserError::NotFound)?;
    preference::Mutation::delete(&conn, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_test_helpers::fixtures::create_user;
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_single_preference_per_user() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "picky").await.unwrap();
        let token = bearer(&app, user.id);

        let (status, created) = app
            .request(
                Method::POST,
                "/api/v1/users/preferences",
                Some(&token),
                Some(json!({"preferred_categories": ["rust"], "learning_pace": "fast"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["preferred_categories"], json!(["rust"]));
        assert_eq!(created["difficulty_preference"], "");

        let (status, _) = app
            .request(Method::POST, "/api/v1/users/preferences", Some(&token), Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, list) = app
            .request(Method::GET, "/api/v1/users/preferences", Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let uri = format!("/api/v1/users/preferences/{}", created["id"].as_str().unwrap());
        let (status, updated) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({"difficulty_preference": "advanced"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["difficulty_preference"], "advanced");
        assert_eq!(updated["learning_pace"], "fast");

        let (status, me) = app.request(Method::GET, "/api/v1/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["preferences"]["difficulty_preference"], "advanced");

        let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.request(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test(tokio::test)]
    async fn test_preferences_are_private() {
        let app = TestApp::new().await;
        let owner = create_user(&app.conn, "owner").await.unwrap();
        let other = create_user(&app.conn, "other").await.unwrap();

        let (_, created) = app
            .request(
                Method::POST,
                "/api/v1/users/preferences",
                Some(&bearer(&app, owner.id)),
                Some(json!({})),
            )
            .await;
        let uri = format!("/api/v1/users/preferences/{}", created["id"].as_str().unwrap());

        let (status, _) = app
            .request(Method::GET, &uri, Some(&bearer(&app, other.id)), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
