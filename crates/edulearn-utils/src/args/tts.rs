use clap::Args;

#[derive(Debug, Clone, Args)]
#[allow(clippy::struct_field_names)]
pub struct TTSConfig {
    #[arg(long = "elevenlabs-key", env = "ELEVENLABS_API_KEY", required = false)]
    pub api_key: Option<String>,
    #[arg(long = "elevenlabs-model", env = "ELEVENLABS_MODEL", default_value = "eleven_multilingual_v2")]
    pub model: String,
    #[arg(long = "elevenlabs-voice", env = "ELEVENLABS_VOICE", default_value = "21m00Tcm4TlvDq8ikWAM")]
    pub voice: String,
}
