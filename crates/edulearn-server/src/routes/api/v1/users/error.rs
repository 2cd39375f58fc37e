use crate::routes::error::{FORBIDDEN, NOT_FOUND, SERVER_ERROR, ValidationErrors, detail};
use axum::response::{IntoResponse, Response};
use edulearn_core::password::PasswordError;
use edulearn_db::sea_orm::DbErr;
use http::StatusCode;
use std::error::Error;
use thiserror::Error;

const PREFERENCE_EXISTS: &str = "Preferences for this user already exist.";

#[derive(Error, Debug)]
pub(crate) enum UserError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("Error converting stored data")]
    Conversion(#[from] edulearn_model_tools::error::Error),

    #[error("Error hashing password")]
    Password(#[from] PasswordError),

    #[error("Background task failed")]
    Join(#[from] tokio::task::JoinError),

    #[error("User/preference/activity could not be found")]
    NotFound,

    #[error("Not allowed to change another user")]
    Forbidden,

    #[error("{PREFERENCE_EXISTS}")]
    PreferenceExists,
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound | Self::SeaOrmError(DbErr::RecordNotFound(_)) => detail(StatusCode::NOT_FOUND, NOT_FOUND),
            Self::Forbidden => detail(StatusCode::FORBIDDEN, FORBIDDEN),
            Self::Validation(errors) => errors.into_response(),
            Self::PreferenceExists => detail(StatusCode::BAD_REQUEST, PREFERENCE_EXISTS),
            error => {
                tracing::error!(error = &error as &dyn Error, "user request failed");
                detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
            }
        }
    }
}
