use async_openai::config::OpenAIConfig;
use edulearn_utils::args::llm::LlmServices as LlmServiceArgs;

const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_GRADING_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    key: Option<String>,
    base_url: Option<String>,
    chat_model: Option<String>,
    grading_model: Option<String>,
    embedding_model: Option<String>,
    transcription_model: Option<String>,
    pub embedding_dimension: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: None,
            chat_model: None,
            grading_model: None,
            embedding_model: None,
            transcription_model: None,
            embedding_dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

impl From<LlmServiceArgs> for LlmConfig {
    fn from(config: LlmServiceArgs) -> LlmConfig {
        Self {
            key: config.openai_key,
            base_url: config.openai_base_url,
            chat_model: config.chat_model,
            grading_model: config.grading_model,
            embedding_model: config.embedding_model,
            transcription_model: config.transcription_model,
            embedding_dimension: config.embedding_dimension,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn new(key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            key,
            base_url,
            ..Self::default()
        }
    }

    /// Without a key every call fails fast and the callers fall back to their static answers.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    #[must_use]
    pub fn get_openai_config(&self) -> OpenAIConfig {
        let mut openai_config = OpenAIConfig::default();
        if let Some(base_url) = &self.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }
        if let Some(api_key) = &self.key {
            openai_config = openai_config.with_api_key(api_key);
        }
        openai_config
    }

    #[must_use]
    pub fn get_chat_model(&self) -> &str {
        self.chat_model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
    }

    #[must_use]
    pub fn get_grading_model(&self) -> &str {
        if let Some(model) = &self.grading_model {
            model.as_str()
        } else {
            tracing::debug!("Using chat model for grading");
            self.chat_model.as_deref().unwrap_or(DEFAULT_GRADING_MODEL)
        }
    }

    #[must_use]
    pub fn get_embedding_model(&self) -> &str {
        self.embedding_model.as_deref().unwrap_or(DEFAULT_EMBEDDING_MODEL)
    }

    #[must_use]
    pub fn get_transcription_model(&self) -> &str {
        self.transcription_model
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCRIPTION_MODEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grading_model_falls_back_to_chat_model() {
        let mut config = LlmConfig::new(Some("key".to_owned()), None);
        assert_eq!(config.get_grading_model(), DEFAULT_GRADING_MODEL);
        config.chat_model = Some("local-model".to_owned());
        assert_eq!(config.get_grading_model(), "local-model");
        config.grading_model = Some("grader".to_owned());
        assert_eq!(config.get_grading_model(), "grader");
        assert!(config.is_configured());
    }

    #[test]
    fn test_defaults() {
        let config = LlmConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.get_embedding_model(), DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.get_transcription_model(), DEFAULT_TRANSCRIPTION_MODEL);
        assert_eq!(config.embedding_dimension, 1536);
    }
}
