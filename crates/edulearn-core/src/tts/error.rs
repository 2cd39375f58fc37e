use edulearn_utils::media::MediaError;
use std::error::Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TTSError {
    #[error(transparent)]
    Elevenlabs(#[from] elevenlabs_rs::error::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("Text to speech is not configured")]
    NotConfigured,
    #[error("Nothing to synthesize")]
    EmptyText,
    #[error("Undefined Elevenlabs error: {0}")]
    Undefined(#[from] Box<dyn Error + Send + Sync>),
}
