use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid storage path: {0}")]
    InvalidPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage addressed by relative, `/`-separated paths.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Stores `data` and returns the public URL for it.
    async fn upload(&self, data: Bytes, path: &str, mime_type: &str) -> Result<String, StorageError>;

    async fn download(&self, path: &str) -> Result<Bytes, StorageError>;

    /// Deleting a missing file succeeds.
    async fn delete(&self, path: &str) -> Result<(), StorageError>;

    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Inverse of the URL returned by [`StorageProvider::upload`].
    fn path_from_url(&self, url: &str) -> Option<String>;
}

pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(path);
        let clean = !path.is_empty() && relative.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            warn!("Rejected storage path: {}", path);
            return Err(StorageError::InvalidPath(path.to_string()));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageProvider for LocalStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn upload(&self, data: Bytes, path: &str, mime_type: &str) -> Result<String, StorageError> {
        let full_path = self.resolve(path)?;
        if let Some(dir) = full_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&full_path, &data).await?;
        debug!("💾 Stored {} ({} bytes, {})", path, data.len(), mime_type);
        Ok(format!("{}/{}", self.base_url, path))
    }

    async fn download(&self, path: &str) -> Result<Bytes, StorageError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::metadata(&full_path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn path_from_url(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.base_url)?
            .strip_prefix('/')
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }
}

/// Content type for a stored file, by extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

pub fn from_config(config: &Config) -> Arc<dyn StorageProvider> {
    if config.storage_provider != "local" {
        warn!("Unknown storage provider '{}', using local storage", config.storage_provider);
    }
    info!("📁 Local storage at {}", config.local_upload_path.display());
    Arc::new(LocalStorage::new(config.local_upload_path.clone(), &config.upload_base_url))
}
