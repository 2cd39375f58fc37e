use crate::AppConfig;
use crate::auth::TokenType;
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::{Extension, RequestPartsExt};
use axum_auth::AuthBearer;
use axum_extra::extract::Cached;
use edulearn_db::user;
use edulearn_entity::user::Model as UserModel;
use http::StatusCode;
use http::request::Parts;
use sea_orm::DatabaseConnection;
use std::error::Error;
use url::form_urlencoded;
use uuid::Uuid;

pub fn extract_auth_token_from_params(parts: &Parts) -> Option<String> {
    let query = parts.uri.query()?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}

type Rejection = (StatusCode, &'static str);

#[derive(Clone)]
struct Session {
    user: UserModel,
}

#[derive(Clone)]
pub(crate) struct ExtractUser(pub UserModel);

#[derive(Clone)]
pub(crate) struct ExtractUserId(pub Uuid);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Authorization header first, then the access_token query parameter
        let token = if let Ok(AuthBearer(token)) = parts.extract::<AuthBearer>().await {
            token
        } else if let Some(token) = extract_auth_token_from_params(parts) {
            token
        } else {
            return Err((StatusCode::UNAUTHORIZED, "No authentication token provided"));
        };

        let Extension::<AppConfig>(app_config) = parts.extract::<Extension<AppConfig>>().await.map_err(|error| {
            tracing::error!(error = &error as &dyn Error, "app config not found in app data");
            (StatusCode::INTERNAL_SERVER_ERROR, "App config not found")
        })?;
        let Extension::<DatabaseConnection>(conn) =
            parts
                .extract::<Extension<DatabaseConnection>>()
                .await
                .map_err(|error| {
                    tracing::error!(
                        error = &error as &dyn Error,
                        "database connection not found in app data"
                    );
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database Connection not found")
                })?;

        let claims = match app_config.tokens().validate(&token, Some(TokenType::Access)) {
            Ok(claims) => claims,
            Err(error) => {
                if error.is_expired() {
                    tracing::debug!("access token expired");
                } else {
                    tracing::warn!(error = &error as &dyn Error, "error validating token");
                }
                return Err((StatusCode::UNAUTHORIZED, "Invalid token"));
            }
        };

        Self::from_db(&conn, claims.sub).await.map(|user| Self { user })
    }
}

impl Session {
    async fn from_db(conn: &DatabaseConnection, user_id: Uuid) -> Result<UserModel, Rejection> {
        let user = match user::Query::find_user_by_id(conn, user_id).await {
            Ok(Some(user)) if user.is_active => user,
            Ok(_) => return Err((StatusCode::UNAUTHORIZED, "Authentication failed.")),
            Err(error) => {
                tracing::error!(error = &error as &dyn Error, %user_id, "failed to load user");
                return Err((StatusCode::INTERNAL_SERVER_ERROR, "Error loading user"));
            }
        };

        sentry::configure_scope(|scope| {
            scope.set_user(Some(sentry::User {
                id: Some(user.id.as_hyphenated().to_string()),
                ..Default::default()
            }));
        });

        Ok(user)
    }
}

impl<S> OptionalFromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let Ok(session) = Cached::<Session>::from_request_parts(parts, state).await else {
            return Ok(None);
        };
        Ok(Some(Self(session.0.user)))
    }
}

impl<S> FromRequestParts<S> for ExtractUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user))
    }
}

impl<S> FromRequestParts<S> for ExtractUserId
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session: Session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Request;

    #[test]
    fn test_token_from_query() {
        let (parts, ()) = Request::get("/api/v1/users/me?page=2&access_token=abc%2Edef")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(extract_auth_token_from_params(&parts).as_deref(), Some("abc.def"));

        let (parts, ()) = Request::get("/api/v1/users/me").body(()).unwrap().into_parts();
        assert!(extract_auth_token_from_params(&parts).is_none());
    }
}
