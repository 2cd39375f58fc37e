#[macro_use]
extern crate diesel_migrations;
use crate::auth::TokenConfig;
use crate::db::migration;
use crate::opt::{Commands, Db, Run};
use anyhow::Result;
use axum::serve;
use clap::Parser;
use edulearn_core::llm_config::LlmConfig;
use edulearn_core::tts::config::TTSConfig;
use edulearn_db::sea_orm::{ConnectOptions, Database};
use edulearn_utils::media::MediaStore;
use edulearn_utils::net::create_listener;
use edulearn_worker::TaskQueue;
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

mod app;
mod auth;
mod db;
mod opt;
mod permissions;
mod routes;
mod user;

#[cfg(test)]
mod test_support;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug)]
pub(crate) struct InnerAppConfig {
    llm_config: Arc<LlmConfig>,
    tts_config: Option<TTSConfig>,
    media: MediaStore,
    tokens: TokenConfig,
    tasks: TaskQueue,
}

#[derive(Clone, Debug)]
pub(crate) struct AppConfig(Arc<InnerAppConfig>);

impl AppConfig {
    fn new(
        llm_config: Arc<LlmConfig>,
        tts_config: Option<TTSConfig>,
        media: MediaStore,
        tokens: TokenConfig,
        tasks: TaskQueue,
    ) -> Self {
        Self(Arc::new(InnerAppConfig {
            llm_config,
            tts_config,
            media,
            tokens,
            tasks,
        }))
    }

    pub fn llm_config(&self) -> &LlmConfig {
        &self.0.llm_config
    }

    pub fn tts_config(&self) -> Option<&TTSConfig> {
        self.0.tts_config.as_ref()
    }

    pub fn media(&self) -> &MediaStore {
        &self.0.media
    }

    pub fn tokens(&self) -> &TokenConfig {
        &self.0.tokens
    }

    pub fn tasks(&self) -> &TaskQueue {
        &self.0.tasks
    }
}

async fn run(opt: Run) -> Result<()> {
    let _guard = edulearn_utils::tracing::setup(
        edulearn_utils::tracing::TracingConfig::builder()
            .package(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .sentry_dsn(opt.sentry_dsn.clone())
            .env(opt.env.clone())
            .build(),
    )?;

    let db_url = opt.db.database_url.clone();
    let migrated = migration(&db_url)
        .inspect_err(|error| tracing::error!(error = error as &dyn std::error::Error, "failed to run migrations"))?;
    tracing::info!(count = migrated.len(), "applied migrations");

    let seaorm_pool_options = build_connect_options(&opt.db, db_url);
    let seaorm_pool = Database::connect(seaorm_pool_options).await?;

    let Run {
        host,
        port,
        auth,
        llm_services,
        tts,
        media,
        embedding_refresh_interval,
        ..
    } = opt;

    let llm_config: Arc<LlmConfig> = Arc::new(llm_services.into());
    if !llm_config.is_configured() {
        tracing::warn!("no OpenAI key configured, AI features answer with their fallbacks");
    }
    let tts_config = TTSConfig::from_args(tts);
    if tts_config.is_none() {
        tracing::info!("no ElevenLabs key configured, text to speech is disabled");
    }

    let (tasks, _worker) = edulearn_worker::spawn(
        seaorm_pool.clone(),
        Arc::clone(&llm_config),
        embedding_refresh_interval.map(Duration::from_secs),
    );

    let app_config = AppConfig::new(
        llm_config,
        tts_config,
        MediaStore::new(media.media_root, media.media_url.clone()),
        TokenConfig::new(&auth.jwt_secret, auth.access_token_minutes, auth.refresh_token_days),
        tasks,
    );

    let app = app::create_app(app_config, &auth.origins, &media.media_url, seaorm_pool)?;

    let listener = create_listener((host, port), (DEFAULT_HOST, DEFAULT_PORT)).await?;

    let service = app.into_make_service();
    tracing::info!(local_addr = %listener.local_addr()?, "starting app");
    serve::serve(listener, service).await?;
    Ok(())
}

fn build_connect_options(db_options: &Db, db_url: Url) -> ConnectOptions {
    let mut seaorm_pool_options = ConnectOptions::new(db_url);
    if let Some(min_connections) = db_options.db_min_connections {
        seaorm_pool_options.min_connections(min_connections);
    }
    if let Some(max_connections) = db_options.db_max_connections {
        seaorm_pool_options.max_connections(max_connections);
    }
    seaorm_pool_options.sqlx_logging_level(log::LevelFilter::Debug);
    seaorm_pool_options
}

fn main() -> Result<()> {
    let main = async {
        let opt = opt::Cli::parse();

        match opt.command {
            Commands::Run(o) => run(o).await?,
        }
        Ok(())
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
