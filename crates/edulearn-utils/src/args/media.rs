use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct MediaArgs {
    /// Directory generated audio is written to.
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    pub media_root: PathBuf,
    /// Public URL prefix the media directory is served under.
    #[arg(long, env = "MEDIA_URL", default_value = "/media/")]
    pub media_url: String,
}
