use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use sea_orm::DbErr;
use std::borrow::Cow;
use std::collections::BTreeMap;

use serde_derive::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use utoipa::ToSchema;

pub(crate) const SERVER_ERROR: &str = "A server error occurred.";
pub(crate) const NOT_FOUND: &str = "Not found.";
pub(crate) const FORBIDDEN: &str = "You do not have permission to perform this action.";

#[derive(Error, Debug)]
pub(crate) enum TokenError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Token is invalid or expired")]
    InvalidToken(#[source] crate::auth::AuthError),

    #[error("Database Error")]
    DatabaseError(#[from] DbErr),

    #[error("Error issuing token")]
    Issue(#[source] crate::auth::AuthError),
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum TokenErrorType {
    InvalidCredentials,
    TokenNotValid,
}

pub(crate) trait GetStatusCode {
    fn status_code(&self) -> http::StatusCode;
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ErrorData<T> {
    pub(crate) error: T,
    pub(crate) error_description: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Map<String, Value>>,
}

impl<T> ErrorData<T> {
    pub fn new<A: Into<Cow<'static, str>>>(error: T, error_description: A) -> Self {
        Self {
            error,
            error_description: error_description.into(),
            data: None,
        }
    }
}

pub(crate) trait ErrorDataProvider<T: GetStatusCode> {
    fn error_data(self) -> Option<ErrorData<T>>;
}

impl ErrorDataProvider<TokenErrorType> for TokenError {
    fn error_data(self) -> Option<ErrorData<TokenErrorType>> {
        use TokenError::{DatabaseError, InvalidCredentials, InvalidToken, Issue};
        let res = match self {
            InvalidCredentials => ErrorData::new(
                TokenErrorType::InvalidCredentials,
                "No active account found with the given credentials",
            ),
            InvalidToken(error) => {
                let mut data = Map::new();
                data.insert("token_class".to_owned(), Value::from("AccessToken"));
                ErrorData {
                    data: Some(data),
                    ..ErrorData::new(TokenErrorType::TokenNotValid, error.to_string())
                }
            }
            DatabaseError(_) | Issue(_) => return None,
        };
        Some(res)
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        error_to_axum_response(self)
    }
}

impl GetStatusCode for TokenError {
    fn status_code(&self) -> http::StatusCode {
        match self {
            Self::DatabaseError(_) => http::StatusCode::SERVICE_UNAVAILABLE,
            _ => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl GetStatusCode for TokenErrorType {
    fn status_code(&self) -> http::StatusCode {
        match self {
            Self::InvalidCredentials | Self::TokenNotValid => http::StatusCode::UNAUTHORIZED,
        }
    }
}

pub(crate) fn error_to_axum_response<E, T>(error: T) -> Response
where
    E: GetStatusCode + serde::Serialize,
    T: GetStatusCode + ErrorDataProvider<E>,
{
    let status_code = GetStatusCode::status_code(&error);
    let error_data = error.error_data();
    match error_data {
        Some(data) => {
            let status_code = GetStatusCode::status_code(&data.error);
            let json = Json(data);
            (status_code, json).into_response()
        }
        None => status_code.into_response(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct Detail {
    pub(crate) detail: Cow<'static, str>,
}

pub(crate) fn detail<A: Into<Cow<'static, str>>>(status_code: StatusCode, detail: A) -> Response {
    (status_code, Json(Detail { detail: detail.into() })).into_response()
}

/// Field name to messages, answered with 400.
#[derive(Error, Debug, Default, Serialize)]
#[error("Invalid input")]
#[serde(transparent)]
pub(crate) struct ValidationErrors(BTreeMap<&'static str, Vec<Cow<'static, str>>>);

impl ValidationErrors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn field<A: Into<Cow<'static, str>>>(field: &'static str, message: A) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub(crate) fn add<A: Into<Cow<'static, str>>>(&mut self, field: &'static str, message: A) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub(crate) fn check(self) -> Result<(), Self> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoResponse for ValidationErrors {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;
    use test_log::test;

    async fn body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test(tokio::test)]
    async fn test_validation_errors_body() {
        let mut errors = ValidationErrors::new();
        assert!(ValidationErrors::new().check().is_ok());
        errors.add("password", "too short");
        errors.add("password", "too common");
        errors.add("email", "taken");

        let response = errors.check().unwrap_err().into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body(response).await,
            json!({"email": ["taken"], "password": ["too short", "too common"]})
        );
    }

    #[test(tokio::test)]
    async fn test_token_errors() {
        let response = TokenError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body(response).await["error"], "invalid_credentials");

        let response = TokenError::DatabaseError(DbErr::Custom("down".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test(tokio::test)]
    async fn test_detail_body() {
        let response = detail(StatusCode::FORBIDDEN, FORBIDDEN);
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body(response).await, json!({"detail": FORBIDDEN}));
    }
}
