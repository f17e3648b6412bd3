use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use url::Url;

use crate::services::media::store::{MediaKey, MediaResult, MediaStore};

/// Directory-backed object store.
///
/// Objects are plain files under `root`; `/media` serves them (see `app.rs`).
#[derive(Clone, Debug)]
pub struct LocalMediaStore {
    root: PathBuf,
    public_base_url: Url,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Url) -> Self {
        Self {
            root: root.into(),
            public_base_url,
        }
    }

    fn path(&self, key: &MediaKey) -> PathBuf {
        self.root.join(key.as_str())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &MediaKey, bytes: Bytes) -> MediaResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path(key), &bytes).await?;
        Ok(())
    }

    async fn delete(&self, key: &MediaKey) -> MediaResult<bool> {
        match tokio::fs::remove_file(self.path(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &MediaKey) -> MediaResult<bool> {
        Ok(tokio::fs::try_exists(self.path(key)).await?)
    }

    fn url(&self, key: &MediaKey) -> MediaResult<Url> {
        Ok(self.public_base_url.join(key.as_str())?)
    }
}
