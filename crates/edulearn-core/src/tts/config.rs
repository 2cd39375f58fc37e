#[derive(Debug, Clone)]
#[allow(clippy::struct_field_names)]
pub struct TTSConfig {
    pub api_key: String,
    pub model: String,
    pub voice: String,
}

impl TTSConfig {
    /// `None` when no ElevenLabs key is configured.
    #[must_use]
    pub fn from_args(value: edulearn_utils::args::tts::TTSConfig) -> Option<Self> {
        let api_key = value.api_key.filter(|key| !key.is_empty())?;
        Some(Self {
            api_key,
            model: value.model,
            voice: value.voice,
        })
    }
}
