pub(crate) mod activities;
pub(crate) mod error;
pub(crate) mod preferences;
pub(crate) mod token;

use crate::AppConfig;
use crate::permissions::Permission;
use crate::routes::api::v1::users::error::UserError;
use crate::routes::error::ValidationErrors;
use crate::user::ExtractUser;
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::routing::{Router, get};
use axum::{Extension, Json};
use edulearn_core::password::hash_password;
use edulearn_db::sea_orm::ActiveValue::Set;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_db::{preference, user};
use edulearn_entity::user::{ActiveModel as UserActiveModel, Model as UserModel};
use edulearn_model::user::{NewUser, User, UserChanges};
use edulearn_model_tools::convert::{FromDbModel, IntoModel, TryFromDbModel};
use edulearn_worker::Task;
use http::StatusCode;
use protect_axum::protect;
use serde_json::json;
use tokio::task;
use uuid::Uuid;

pub(crate) const MIN_PASSWORD_LENGTH: usize = 8;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_users).post(register))
        .route("/me", get(get_me).put(update_me).patch(update_me))
        .merge(token::create_router())
        .merge(preferences::create_router())
        .merge(activities::create_router())
        .route(
            "/{id}",
            get(get_user).put(update_user).patch(update_user).delete(delete_user),
        )
        .with_state(())
}

async fn check_unique(
    conn: &DatabaseConnection,
    errors: &mut ValidationErrors,
    email: Option<&str>,
    username: Option<&str>,
    current: Option<Uuid>,
) -> Result<(), UserError> {
    let other = |found: Option<UserModel>| found.is_some_and(|found| Some(found.id) != current);
    if let Some(email) = email {
        if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        } else if other(user::Query::find_user_by_email(conn, email).await?) {
            errors.add("email", "user with this email already exists.");
        }
    }
    if let Some(username) = username {
        if username.trim().is_empty() {
            errors.add("username", "This field may not be blank.");
        } else if other(user::Query::find_user_by_username(conn, username.trim()).await?) {
            errors.add("username", "A user with that username already exists.");
        }
    }
    Ok(())
}

fn check_password(errors: &mut ValidationErrors, password: &str, password_confirm: &str) {
    if password != password_confirm {
        errors.add("password", "Password fields didn't match.");
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password",
            format!("This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."),
        );
    }
}

fn apply_changes(user_id: Uuid, changes: UserChanges) -> UserActiveModel {
    let mut model = user::Mutation::changes(user_id);
    if let Some(email) = changes.email {
        model.email = Set(email.trim().to_lowercase());
    }
    if let Some(username) = changes.username {
        model.username = Set(username.trim().to_owned());
    }
    if let Some(first_name) = changes.first_name {
        model.first_name = Set(first_name);
    }
    if let Some(last_name) = changes.last_name {
        model.last_name = Set(last_name);
    }
    if let Some(bio) = changes.bio {
        model.bio = Set(bio);
    }
    if let Some(date_of_birth) = changes.date_of_birth {
        model.date_of_birth = Set(Some(date_of_birth));
    }
    if let Some(profile_picture) = changes.profile_picture {
        model.profile_picture = Set(Some(profile_picture));
    }
    if let Some(interests) = changes.interests {
        model.interests = Set(json!(interests));
    }
    if let Some(learning_style) = changes.learning_style {
        model.learning_style = Set(learning_style);
    }
    model
}

async fn save_changes(
    conn: &DatabaseConnection,
    app_config: &AppConfig,
    user_id: Uuid,
    changes: UserChanges,
) -> Result<UserModel, UserError> {
    let mut errors = ValidationErrors::new();
    check_unique(
        conn,
        &mut errors,
        changes.email.as_deref(),
        changes.username.as_deref(),
        Some(user_id),
    )
    .await?;
    errors.check()?;

    let updated = user::Mutation::update_user(conn, apply_changes(user_id, changes)).await?;
    app_config.tasks().enqueue(Task::UpdateUserEmbedding(updated.id));
    Ok(updated)
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewUser,
    responses(
        (status = CREATED, description = "Registered user", body = User),
        (status = BAD_REQUEST, description = "Invalid registration data"),
    ),
    tag = "v1/users",
)]
pub(crate) async fn register(
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(new_user): Json<NewUser>,
) -> Result<impl IntoResponse, UserError> {
    let mut errors = ValidationErrors::new();
    check_password(&mut errors, &new_user.password, &new_user.password_confirm);
    check_unique(
        &conn,
        &mut errors,
        Some(&new_user.email),
        Some(&new_user.username),
        None,
    )
    .await?;
    errors.check()?;

    let password = new_user.password;
    let password_hash = task::spawn_blocking(move || hash_password(&password)).await??;

    let created = user::Mutation::create_user(
        &conn,
        UserActiveModel {
            email: Set(new_user.email),
            username: Set(new_user.username.trim().to_owned()),
            password_hash: Set(password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            bio: Set(new_user.bio),
            date_of_birth: Set(new_user.date_of_birth),
            profile_picture: Set(new_user.profile_picture),
            interests: Set(json!(new_user.interests)),
            learning_style: Set(new_user.learning_style),
            is_staff: Set(false),
            is_active: Set(true),
            ..Default::default()
        },
    )
    .await?;
    tracing::info!(user = %created.id, "registered user");
    app_config.tasks().enqueue(Task::UpdateUserEmbedding(created.id));

    Ok((StatusCode::CREATED, Json(User::from_db_model(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses(
        (status = OK, description = "All users", body = [User]),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn list_users(Extension(conn): Extension<DatabaseConnection>) -> Result<impl IntoResponse, UserError> {
    let users = user::Query::list_users(&conn)
        .await?
        .into_iter()
        .map(IntoModel::into_model)
        .collect::<Vec<User>>();
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "user id")),
    responses(
        (status = OK, description = "A single user", body = User),
        (status = NOT_FOUND, description = "Unknown user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_user(
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    let found = user::Query::find_user_by_id(&conn, id).await?.ok_or(UserError::NotFound)?;
    Ok(Json(User::from_db_model(found)))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "user id")),
    request_body = UserChanges,
    responses(
        (status = OK, description = "Updated user", body = User),
        (status = FORBIDDEN, description = "Only the user itself or staff may change a user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_user(
    ExtractUser(caller): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UserChanges>,
) -> Result<impl IntoResponse, UserError> {
    if caller.id != id && !caller.is_staff {
        return Err(UserError::Forbidden);
    }
    user::Query::find_user_by_id(&conn, id).await?.ok_or(UserError::NotFound)?;
    let updated = save_changes(&conn, &app_config, id, changes).await?;
    Ok(Json(User::from_db_model(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "user id")),
    responses(
        (status = NO_CONTENT, description = "User deleted"),
        (status = FORBIDDEN, description = "Only the user itself or staff may delete a user"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn delete_user(
    ExtractUser(caller): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, UserError> {
    if caller.id != id && !caller.is_staff {
        return Err(UserError::Forbidden);
    }
    user::Query::find_user_by_id(&conn, id).await?.ok_or(UserError::NotFound)?;
    user::Mutation::delete(&conn, id).await?;
    tracing::info!(user = %id, deleted_by = %caller.id, "deleted user");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = OK, description = "The signed in user with preferences", body = User),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn get_me(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
) -> Result<impl IntoResponse, UserError> {
    let preference = preference::Query::find_by_user(&conn, user.id).await?;
    Ok(Json(User::try_from_db_model((user, preference))?))
}

#[utoipa::path(
    method(put, patch),
    path = "/api/v1/users/me",
    request_body = UserChanges,
    responses(
        (status = OK, description = "Updated profile", body = User),
        (status = BAD_REQUEST, description = "Email or username already taken"),
    ),
    tag = "v1/users",
    security(
        ("token" = [])
    )
)]
#[protect("Permission::Basic", ty = "Permission")]
pub(crate) async fn update_me(
    ExtractUser(user): ExtractUser,
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(changes): Json<UserChanges>,
) -> Result<impl IntoResponse, UserError> {
    let updated = save_changes(&conn, &app_config, user.id, changes).await?;
    let preference = preference::Query::find_by_user(&conn, updated.id).await?;
    Ok(Json(User::try_from_db_model((updated, preference))?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TestApp, bearer};
    use edulearn_test_helpers::fixtures::create_user;
    use http::Method;
    use test_log::test;

    #[test]
    fn test_check_password() {
        let mut errors = ValidationErrors::new();
        check_password(&mut errors, "long enough", "long enough");
        assert!(errors.check().is_ok());

        let mut errors = ValidationErrors::new();
        check_password(&mut errors, "short", "other");
        let body = serde_json::to_value(errors.check().unwrap_err()).unwrap();
        assert_eq!(body["password"].as_array().unwrap().len(), 2);
    }

    #[test(tokio::test)]
    async fn test_register_validation() {
        let app = TestApp::new().await;
        create_user(&app.conn, "taken").await.unwrap();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users",
                None,
                Some(json!({
                    "email": "TAKEN@example.com",
                    "username": "taken",
                    "password": "secret",
                    "password_confirm": "different",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["email"][0], "user with this email already exists.");
        assert_eq!(body["username"][0], "A user with that username already exists.");
        assert_eq!(body["password"].as_array().unwrap().len(), 2);
    }

    #[test(tokio::test)]
    async fn test_register_and_sign_in() {
        let mut app = TestApp::new().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users",
                None,
                Some(json!({
                    "email": "New@Example.com",
                    "username": "newbie",
                    "password": "correct horse",
                    "password_confirm": "correct horse",
                    "interests": ["rust"],
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "new@example.com");
        assert_eq!(body["interests"], json!(["rust"]));
        let user_id: Uuid = serde_json::from_value(body["id"].clone()).unwrap();
        assert_eq!(app.tasks.try_recv().unwrap(), Task::UpdateUserEmbedding(user_id));

        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/users/token",
                None,
                Some(json!({"email": "new@example.com", "password": "wrong password"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, tokens) = app
            .request(
                Method::POST,
                "/api/v1/users/token",
                None,
                Some(json!({"email": "new@example.com", "password": "correct horse"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let access = tokens["access"].as_str().unwrap().to_owned();

        let (status, me) = app
            .request(Method::GET, "/api/v1/users/me", Some(&access), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "newbie");
    }

    #[test(tokio::test)]
    async fn test_me_requires_authentication() {
        let app = TestApp::new().await;
        let (status, _) = app.request(Method::GET, "/api/v1/users/me", None, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let user = create_user(&app.conn, "reader").await.unwrap();
        let token = bearer(&app, user.id);
        let (status, body) = app
            .request(
                Method::GET,
                &format!("/api/v1/users/me?access_token={token}"),
                None,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], json!(user.id));
    }

    #[test(tokio::test)]
    async fn test_update_other_user_is_forbidden() {
        let mut app = TestApp::new().await;
        let alice = create_user(&app.conn, "alice").await.unwrap();
        let bob = create_user(&app.conn, "bob").await.unwrap();
        let token = bearer(&app, alice.id);

        let (status, _) = app
            .request(
                Method::PATCH,
                &format!("/api/v1/users/{}", bob.id),
                Some(&token),
                Some(json!({"bio": "hacked"})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .request(
                Method::PATCH,
                "/api/v1/users/me",
                Some(&token),
                Some(json!({"bio": "Learning Rust", "username": "bob"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("username").is_some());

        let (status, body) = app
            .request(
                Method::PATCH,
                "/api/v1/users/me",
                Some(&token),
                Some(json!({"bio": "Learning Rust"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bio"], "Learning Rust");
        assert_eq!(app.tasks.try_recv().unwrap(), Task::UpdateUserEmbedding(alice.id));
    }

    #[test(tokio::test)]
    async fn test_delete_self() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "leaving").await.unwrap();
        let token = bearer(&app, user.id);

        let (status, _) = app
            .request(Method::DELETE, &format!("/api/v1/users/{}", user.id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(user::Query::find_user_by_id(&app.conn, user.id).await.unwrap().is_none());
    }
}
