use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use url::Url;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error("Invalid Path: {0}")]
    InvalidPath(PathBuf),
}

/// Stores generated files below a root directory that is served under a public URL prefix.
#[derive(Clone, Debug)]
pub struct MediaStore {
    base_path: PathBuf,
    base_url: String,
}

impl MediaStore {
    #[must_use]
    pub fn new(base_path: PathBuf, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self { base_path, base_url }
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn sub_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, MediaError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || !path.components().all(|component| matches!(component, Component::Normal(_))) {
            return Err(MediaError::InvalidPath(path.to_path_buf()));
        }
        Ok(self.base_path.join(path))
    }

    /// Writes `content` to `path` below the root and returns its public URL.
    pub async fn store_file(&self, path: impl AsRef<Path>, content: &[u8]) -> Result<String, MediaError> {
        let relative = path.as_ref();
        let full_path = self.sub_path(relative)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        tracing::trace!(path = ?full_path, "storing media file");
        fs::write(&full_path, content).await?;
        Ok(self.url_for(relative))
    }

    /// Stores `content` under `<directory>/<uuid>.<extension>`.
    pub async fn store_generated(
        &self,
        directory: &str,
        extension: &str,
        content: &[u8],
    ) -> Result<String, MediaError> {
        let path = Path::new(directory).join(format!("{}.{extension}", Uuid::new_v4()));
        self.store_file(path, content).await
    }

    pub async fn load_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, MediaError> {
        let full_path = self.sub_path(path)?;
        Ok(fs::read(full_path).await?)
    }

    #[must_use]
    pub fn url_for(&self, path: impl AsRef<Path>) -> String {
        let relative = path
            .as_ref()
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match Url::parse(&self.base_url).and_then(|url| url.join(&relative)) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{relative}", self.base_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test(tokio::test)]
    async fn test_store_generated_audio() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf(), "/media");
        let url = store.store_generated("tts_audio", "mp3", b"ID3").await.unwrap();
        assert!(url.starts_with("/media/tts_audio/"));
        assert!(url.ends_with(".mp3"));

        let relative = url.trim_start_matches("/media/");
        assert_eq!(store.load_file(relative).await.unwrap(), b"ID3");
    }

    #[test]
    fn test_absolute_url_prefix() {
        let store = MediaStore::new(PathBuf::from("media"), "https://cdn.example.com/media/");
        assert_eq!(
            store.url_for("tts_audio/a.mp3"),
            "https://cdn.example.com/media/tts_audio/a.mp3"
        );
    }

    #[test(tokio::test)]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().to_path_buf(), "/media/");
        let result = store.store_file("../outside.mp3", b"x").await;
        assert!(matches!(result, Err(MediaError::InvalidPath(_))));
    }
}
