use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use edulearn_utils::args::{llm::LlmServices, media::MediaArgs, tts::TTSConfig};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "edulearn", about = "Run the EduLearn learning platform")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Run(Run),
}

#[derive(Debug, Clone, Args)]
#[group(multiple = true, required = false)]
pub(crate) struct Db {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://edulearn.sqlite?mode=rwc")]
    pub(crate) database_url: Url,

    #[arg(long, help = "Min connections")]
    pub(crate) db_min_connections: Option<u32>,

    #[arg(long, help = "Max connections")]
    pub(crate) db_max_connections: Option<u32>,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct Auth {
    #[arg(long, env = "JWT_SECRET", help = "Secret the access and refresh tokens are signed with")]
    pub(crate) jwt_secret: String,

    #[arg(long, default_value_t = 60)]
    pub(crate) access_token_minutes: i64,

    #[arg(long, default_value_t = 1)]
    pub(crate) refresh_token_days: i64,

    #[arg(long, value_delimiter = ',')]
    pub(crate) origins: Vec<String>,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Run {
    #[arg(long)]
    pub(crate) host: Option<IpAddr>,

    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    #[command(flatten)]
    pub(crate) auth: Auth,

    #[command(flatten)]
    pub(crate) llm_services: LlmServices,

    #[command(flatten)]
    pub(crate) tts: TTSConfig,

    #[command(flatten)]
    pub(crate) media: MediaArgs,

    #[arg(long, help = "Seconds between two refreshes of all embeddings, disabled when unset")]
    pub(crate) embedding_refresh_interval: Option<u64>,

    #[arg(long = "sentry-dsn", help = "Sentry url")]
    pub(crate) sentry_dsn: Option<String>,

    #[arg(long, default_value = "dev", help = "Set the environment used by sentry and prometheus")]
    pub(crate) env: String,

    #[command(flatten)]
    pub(crate) db: Db,
}
