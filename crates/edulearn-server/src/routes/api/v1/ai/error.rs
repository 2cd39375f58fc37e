use crate::routes::error::{NOT_FOUND, SERVER_ERROR, ValidationErrors, detail};
use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use edulearn_core::ai::error::AiError as CoreAiError;
use edulearn_core::openai::error::OpenAiError;
use edulearn_core::tts::error::TTSError;
use edulearn_db::sea_orm::DbErr;
use http::StatusCode;
use std::error::Error;
use thiserror::Error;

const TTS_UNAVAILABLE: &str = "Text to speech is not configured.";
const AI_UNAVAILABLE: &str = "The AI service is not configured.";

#[derive(Error, Debug)]
pub(crate) enum AiError {
    #[error("Database error.")]
    SeaOrmError(#[from] DbErr),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Ai(#[from] CoreAiError),

    #[error(transparent)]
    OpenAi(#[from] OpenAiError),

    #[error(transparent)]
    Tts(#[from] TTSError),

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Chat session/feedback/lesson could not be found")]
    NotFound,
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound | Self::SeaOrmError(DbErr::RecordNotFound(_)) | Self::Ai(CoreAiError::NotFound(_)) => {
                detail(StatusCode::NOT_FOUND, NOT_FOUND)
            }
            Self::Validation(errors) => errors.into_response(),
            Self::Ai(CoreAiError::Forbidden(message)) => detail(StatusCode::FORBIDDEN, message),
            Self::Ai(CoreAiError::Validation(message)) => detail(StatusCode::BAD_REQUEST, message),
            Self::Tts(TTSError::NotConfigured) | Self::Ai(CoreAiError::TTS(TTSError::NotConfigured)) => {
                detail(StatusCode::SERVICE_UNAVAILABLE, TTS_UNAVAILABLE)
            }
            Self::Tts(error @ TTSError::EmptyText) => detail(StatusCode::BAD_REQUEST, error.to_string()),
            Self::OpenAi(OpenAiError::NotConfigured) | Self::Ai(CoreAiError::OpenAi(OpenAiError::NotConfigured)) => {
                detail(StatusCode::SERVICE_UNAVAILABLE, AI_UNAVAILABLE)
            }
            Self::Multipart(error) => {
                tracing::debug!(error = &error as &dyn Error, "rejected multipart body");
                detail(StatusCode::BAD_REQUEST, error.body_text())
            }
            error => {
                tracing::error!(error = &error as &dyn Error, "ai request failed");
                detail(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_status_codes() {
        let status = |error: AiError| error.into_response().status();
        assert_eq!(status(CoreAiError::NotFound("quiz").into()), StatusCode::NOT_FOUND);
        assert_eq!(status(CoreAiError::Forbidden("nope").into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status(CoreAiError::Validation("Target date must be in the future".to_owned()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(TTSError::NotConfigured.into()), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(OpenAiError::NotConfigured.into()), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(OpenAiError::EmptyResponse.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
