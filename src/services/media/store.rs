//! Object storage interface for profile pictures and post images.
use async_trait::async_trait;
use axum::body::Bytes;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Images a single post may carry.
pub const MAX_POST_IMAGES: i32 = 4;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Storage-layer errors.
///
/// Note:
/// - Independent from `AppError`; handlers decide how to surface them.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("media url error: {0}")]
    Url(#[from] url::ParseError),
}

/// Object key. Only constructible through the naming helpers below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaKey(String);

impl MediaKey {
    pub fn profile_picture(user_id: Uuid) -> Self {
        Self(format!("pfp-{user_id}.jpg"))
    }

    pub fn post_image(post_id: i64, index: i32) -> Self {
        Self(format!("post-{post_id}_{index}.jpg"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A minimal object store.
///
/// Keys are flat (no directories); values are opaque bytes.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Store (or overwrite) an object.
    async fn put(&self, key: &MediaKey, bytes: Bytes) -> MediaResult<()>;

    // Delete an object. Returns `false` when nothing was stored under `key`.
    async fn delete(&self, key: &MediaKey) -> MediaResult<bool>;

    async fn exists(&self, key: &MediaKey) -> MediaResult<bool>;

    // Public URL clients can fetch the object from.
    fn url(&self, key: &MediaKey) -> MediaResult<Url>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_naming() {
        let user_id = Uuid::nil();
        assert_eq!(
            MediaKey::profile_picture(user_id).as_str(),
            "pfp-00000000-0000-0000-0000-000000000000.jpg"
        );
        assert_eq!(MediaKey::post_image(42, 3).as_str(), "post-42_3.jpg");
    }
}
