use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpenAiError {
    #[error(transparent)]
    Api(#[from] async_openai::error::OpenAIError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("No response from OpenAi")]
    EmptyResponse,

    #[error("Operation timed out")]
    Timeout,

    #[error("No OpenAi key configured")]
    NotConfigured,

    #[error(transparent)]
    HttpClientBuild(#[from] reqwest::Error),
}
