use crate::llm_config::LlmConfig;
use crate::openai::error::OpenAiError;
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    AudioInput, ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
    ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
    CreateChatCompletionResponse, CreateEmbeddingRequestArgs, CreateTranscriptionRequestArgs, ResponseFormat,
};
use backoff::ExponentialBackoffBuilder;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::instrument;
use typed_builder::TypedBuilder;

pub mod error;

#[derive(TypedBuilder, Debug, Clone)]
pub struct CallConfig {
    #[builder(default = Duration::from_secs(60))]
    total_timeout: Duration,
    #[builder(default = Duration::from_secs(30))]
    iteration_timeout: Duration,
    #[builder(default = Duration::from_millis(100))]
    min_retry_interval: Duration,
    #[builder(default = Duration::from_secs(2))]
    max_retry_interval: Duration,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Sampling settings of a single chat completion.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Sampling {
    #[must_use]
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        Self {
            temperature,
            max_tokens,
        }
    }
}

fn build_client(llm_config: &LlmConfig, config: &CallConfig) -> Result<Client<OpenAIConfig>, OpenAiError> {
    if !llm_config.is_configured() {
        return Err(OpenAiError::NotConfigured);
    }

    let http_client = reqwest::Client::builder()
        .timeout(config.iteration_timeout)
        .build()
        .map_err(|error| {
            tracing::error!(error = &error as &dyn Error, "failed to build http client for openai");
            OpenAiError::HttpClientBuild(error)
        })?;

    let mut backoff_builder = ExponentialBackoffBuilder::default();
    backoff_builder
        .with_max_interval(config.max_retry_interval)
        .with_initial_interval(config.min_retry_interval)
        .with_max_elapsed_time(Some(config.total_timeout));

    Ok(Client::with_config(llm_config.get_openai_config())
        .with_http_client(http_client)
        .with_backoff(backoff_builder.build()))
}

async fn with_timeout<T, F>(config: &CallConfig, future: F) -> Result<T, OpenAiError>
where
    F: Future<Output = Result<T, async_openai::error::OpenAIError>>,
{
    match timeout(config.total_timeout, future).await {
        Ok(result) => result.map_err(|error| {
            tracing::warn!(error = &error as &dyn Error, "open AI call failed");
            OpenAiError::Api(error)
        }),
        Err(_) => Err(OpenAiError::Timeout),
    }
}

#[must_use]
pub fn system_message(content: impl Into<String>) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
        content: ChatCompletionRequestSystemMessageContent::Text(content.into()),
        name: None,
    })
}

#[must_use]
pub fn user_message(content: impl Into<String>) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
        content: ChatCompletionRequestUserMessageContent::Text(content.into()),
        name: None,
    })
}

#[must_use]
pub fn assistant_message(content: impl Into<String>) -> ChatCompletionRequestMessage {
    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
        content: Some(ChatCompletionRequestAssistantMessageContent::Text(content.into())),
        refusal: None,
        audio: None,
        tool_calls: None,
        #[allow(deprecated)]
        function_call: None,
        name: None,
    })
}

fn first_content(chat_completion: CreateChatCompletionResponse) -> Result<String, OpenAiError> {
    if let Some(usage) = &chat_completion.usage {
        tracing::debug!(tokens = usage.total_tokens, "openai usage");
    }
    chat_completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(OpenAiError::EmptyResponse)
}

#[instrument(skip(llm_config, config, messages))]
pub async fn chat_completion(
    llm_config: &LlmConfig,
    config: &CallConfig,
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    sampling: Sampling,
) -> Result<String, OpenAiError> {
    let client = build_client(llm_config, config)?;
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(sampling.temperature)
        .max_tokens(sampling.max_tokens)
        .build()?;

    tracing::debug!("sending openai request");
    let chat_completion = with_timeout(config, client.chat().create(request)).await?;
    first_content(chat_completion)
}

/// Requests a JSON object and deserializes it into `T`.
#[instrument(skip(llm_config, config, messages))]
pub async fn json_completion<T: DeserializeOwned>(
    llm_config: &LlmConfig,
    config: &CallConfig,
    model: &str,
    messages: Vec<ChatCompletionRequestMessage>,
    sampling: Sampling,
) -> Result<T, OpenAiError> {
    let client = build_client(llm_config, config)?;
    let request = CreateChatCompletionRequestArgs::default()
        .model(model)
        .messages(messages)
        .temperature(sampling.temperature)
        .max_tokens(sampling.max_tokens)
        .response_format(ResponseFormat::JsonObject)
        .build()?;

    tracing::debug!("sending openai json request");
    let chat_completion = with_timeout(config, client.chat().create(request)).await?;
    let content = first_content(chat_completion)?;
    serde_json::from_str(strip_code_fence(&content)).map_err(|error| {
        tracing::warn!(error = &error as &dyn Error, content, "failed to parse json answer");
        OpenAiError::Json(error)
    })
}

#[instrument(skip(llm_config, config, text))]
pub async fn create_embedding(llm_config: &LlmConfig, config: &CallConfig, text: &str) -> Result<Vec<f32>, OpenAiError> {
    let client = build_client(llm_config, config)?;
    let request = CreateEmbeddingRequestArgs::default()
        .model(llm_config.get_embedding_model())
        .input(text)
        .build()?;

    let response = with_timeout(config, client.embeddings().create(request)).await?;
    response
        .data
        .into_iter()
        .next()
        .map(|item| item.embedding)
        .ok_or(OpenAiError::EmptyResponse)
}

#[instrument(skip(llm_config, config, audio))]
pub async fn transcribe(
    llm_config: &LlmConfig,
    config: &CallConfig,
    file_name: String,
    audio: Vec<u8>,
) -> Result<String, OpenAiError> {
    let client = build_client(llm_config, config)?;
    let request = CreateTranscriptionRequestArgs::default()
        .file(AudioInput::from_vec_u8(file_name, audio))
        .model(llm_config.get_transcription_model())
        .build()?;

    let response = with_timeout(config, client.audio().transcribe(request)).await?;
    Ok(response.text)
}

/// Models sometimes wrap JSON answers in a markdown code fence.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
