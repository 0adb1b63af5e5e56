use crate::error::{Result, WeekendError};
use std::path::{Component, Path, PathBuf};

/// Object storage for iteration assets.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return its public URL.
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String>;

    fn public_url(&self, key: &str) -> String;

    /// Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// Base that every URL returned by [`BlobStore::public_url`] starts with.
    fn base_url(&self) -> &str;
}

/// Blob store backed by a local directory, served over HTTP elsewhere.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let rel = Path::new(key);
        let clean = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(WeekendError::Blob(format!("invalid storage key '{key}'")));
        }
        Ok(self.dir.join(rel))
    }
}

impl BlobStore for FsBlobStore {
    fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<String> {
        let path = self.path_for(key)?;
        crate::io::atomic_write(&path, bytes)?;
        tracing::debug!(key, content_type, size = bytes.len(), "blob stored");
        Ok(self.public_url(key))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if crate::io::remove_file_if_exists(&path)? {
            tracing::debug!(key, "blob deleted");
        }
        Ok(())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
