use crate::AppConfig;
use crate::auth::TokenType;
use crate::routes::error::{ErrorData, TokenError, TokenErrorType};
use axum::routing::{Router, post};
use axum::{Extension, Json};
use edulearn_core::password::verify_password;
use edulearn_db::sea_orm::DatabaseConnection;
use edulearn_db::user;
use edulearn_model::login::{AccessToken, Credentials, RefreshRequest, TokenPair, VerifyRequest};
use serde_json::{Value, json};
use std::error::Error;
use tokio::task;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
        .route("/token/verify", post(verify_token))
        .with_state(())
}

#[utoipa::path(
    post,
    path = "/api/v1/users/token",
    request_body = Credentials,
    responses(
        (status = OK, description = "Access and refresh token", body = TokenPair),
        (status = UNAUTHORIZED, description = "Wrong credentials or inactive account", body = ErrorData<TokenErrorType>),
    ),
    tag = "v1/users",
)]
pub(crate) async fn obtain_token(
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenPair>, TokenError> {
    let Some(found) = user::Query::find_user_by_email(&conn, &credentials.email)
        .await?
        .filter(|found| found.is_active)
    else {
        return Err(TokenError::InvalidCredentials);
    };

    let password = credentials.password;
    let encoded = found.password_hash.clone();
    let valid = task::spawn_blocking(move || verify_password(&password, &encoded))
        .await
        .unwrap_or_else(|error| {
            tracing::error!(error = &error as &dyn Error, "password verification panicked");
            false
        });
    if !valid {
        tracing::debug!(user = %found.id, "wrong password");
        return Err(TokenError::InvalidCredentials);
    }

    let pair = app_config.tokens().issue_pair(found.id).map_err(TokenError::Issue)?;
    tracing::info!(user = %found.id, "issued token pair");
    Ok(Json(pair))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/token/refresh",
    request_body = RefreshRequest,
    responses(
        (status = OK, description = "New access token", body = AccessToken),
        (status = UNAUTHORIZED, description = "Refresh token invalid, expired or of the wrong type", body = ErrorData<TokenErrorType>),
    ),
    tag = "v1/users",
)]
pub(crate) async fn refresh_token(
    Extension(conn): Extension<DatabaseConnection>,
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, TokenError> {
    let claims = app_config
        .tokens()
        .validate(&request.refresh, Some(TokenType::Refresh))
        .map_err(TokenError::InvalidToken)?;

    user::Query::find_user_by_id(&conn, claims.sub)
        .await?
        .filter(|found| found.is_active)
        .ok_or(TokenError::InvalidCredentials)?;

    let access = app_config
        .tokens()
        .issue(claims.sub, TokenType::Access)
        .map_err(TokenError::Issue)?;
    Ok(Json(AccessToken { access }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/token/verify",
    request_body = VerifyRequest,
    responses(
        (status = OK, description = "Token is valid"),
        (status = UNAUTHORIZED, description = "Token is invalid or expired", body = ErrorData<TokenErrorType>),
    ),
    tag = "v1/users",
)]
pub(crate) async fn verify_token(
    Extension(app_config): Extension<AppConfig>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Value>, TokenError> {
    app_config
        .tokens()
        .validate(&request.token, None)
        .map_err(TokenError::InvalidToken)?;
    Ok(Json(json!({})))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, bearer};
    use edulearn_test_helpers::fixtures::create_user;
    use http::{Method, StatusCode};
    use serde_json::json;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_refresh_and_verify() {
        let app = TestApp::new().await;
        let user = create_user(&app.conn, "refresher").await.unwrap();
        let pair = app.config.tokens().issue_pair(user.id).unwrap();

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users/token/refresh",
                None,
                Some(json!({"refresh": pair.refresh})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access"].is_string());

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users/token/refresh",
                None,
                Some(json!({"refresh": pair.access})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token_not_valid");

        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users/token/verify",
                None,
                Some(json!({"token": bearer(&app, user.id)})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));

        let (status, _) = app
            .request(
                Method::POST,
                "/api/v1/users/token/verify",
                None,
                Some(json!({"token": "garbage"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test(tokio::test)]
    async fn test_unknown_email() {
        let app = TestApp::new().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/api/v1/users/token",
                None,
                Some(json!({"email": "nobody@example.com", "password": "whatever1"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid_credentials");
    }
}
