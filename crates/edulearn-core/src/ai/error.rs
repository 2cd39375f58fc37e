use crate::openai::error::OpenAiError;
use crate::tts::error::TTSError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    OpenAi(#[from] OpenAiError),
    #[error(transparent)]
    TTS(#[from] TTSError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0}")]
    Validation(String),
}
