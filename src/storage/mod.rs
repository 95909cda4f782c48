pub mod supabase;

pub use supabase::SupabaseStorage;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage not configured: {0} is empty")]
    NotConfigured(&'static str),

    #[error("invalid storage url: {0}")]
    InvalidUrl(String),

    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("storage rejected {path} with {status}: {body}")]
    Rejected {
        path: String,
        status: u16,
        body: String,
    },
}

/// Binary object hosting for avatars and post images
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store (or overwrite) an object and return its public URL
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError>;
}

/// Extension of an uploaded filename including the dot, or `default`.
/// Anything other than a plain alphanumeric extension falls back too.
fn extension_or(filename: Option<&str>, default: &str) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_else(|| default.to_string())
}

/// `{user_id}/profile{ext}`, one avatar object per user
pub fn avatar_path(user_id: i32, filename: Option<&str>) -> String {
    format!("{}/profile{}", user_id, extension_or(filename, ".png"))
}

/// `{user_id}/{post_id}/image{n}{ext}` with `n` counting from 1
pub fn post_image_path(user_id: i32, post_id: i32, index: usize, filename: Option<&str>) -> String {
    format!(
        "{}/{}/image{}{}",
        user_id,
        post_id,
        index + 1,
        extension_or(filename, ".jpeg")
    )
}
