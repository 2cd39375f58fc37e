use clap::Args;

#[derive(Debug, Clone, Args)]
pub struct LlmServices {
    #[arg(long, env = "OPENAI_API_KEY", required = false)]
    pub openai_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL", required = false)]
    pub openai_base_url: Option<String>,
    #[arg(long, required = false)]
    pub chat_model: Option<String>,
    #[arg(long, required = false)]
    pub grading_model: Option<String>,
    #[arg(long, required = false)]
    pub embedding_model: Option<String>,
    #[arg(long, required = false)]
    pub transcription_model: Option<String>,
    #[arg(long, default_value_t = 1536)]
    pub embedding_dimension: usize,
}
