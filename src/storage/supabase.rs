use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{ObjectStorage, StorageError};
use crate::config::StorageConfig;

/// Client for a Supabase-compatible storage REST API
pub struct SupabaseStorage {
    client: Client,
    base: Url,
    service_key: String,
}

impl SupabaseStorage {
    pub fn new(base_url: &str, service_key: impl Into<String>) -> Result<Self, StorageError> {
        let service_key = service_key.into();
        if base_url.is_empty() {
            return Err(StorageError::NotConfigured("SUPABASE_URL"));
        }
        if service_key.is_empty() {
            return Err(StorageError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"));
        }

        let base = Url::parse(base_url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base,
            service_key,
        })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        Self::new(&config.url, config.service_key.clone())
    }

    /// Base URL with `segments` appended; `/` inside a segment splits it
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StorageError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            for segment in segments {
                path.extend(segment.split('/').filter(|s| !s.is_empty()));
            }
        }
        Ok(url)
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, StorageError> {
        Ok(self
            .endpoint(&["storage/v1/object/public", bucket, path])?
            .to_string())
    }

    async fn check(response: reqwest::Response, path: &str) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Rejected {
            path: path.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let url = self.endpoint(&["storage/v1/object", bucket, path])?;
        debug!("Uploading {} bytes to {}/{}", bytes.len(), bucket, path);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response, path).await?;

        self.public_url(bucket, path)
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let url = self.endpoint(&["storage/v1/object", bucket])?;

        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_url_and_key() {
        assert!(matches!(
            SupabaseStorage::new("", "key"),
            Err(StorageError::NotConfigured("SUPABASE_URL"))
        ));
        assert!(matches!(
            SupabaseStorage::new("https://project.supabase.co", ""),
            Err(StorageError::NotConfigured("SUPABASE_SERVICE_ROLE_KEY"))
        ));
    }

    #[test]
    fn public_url_joins_bucket_and_path() {
        let storage = SupabaseStorage::new("https://project.supabase.co/", "key").unwrap();
        assert_eq!(
            storage.public_url("avatars", "7/profile.png").unwrap(),
            "https://project.supabase.co/storage/v1/object/public/avatars/7/profile.png"
        );
    }

    #[test]
    fn endpoint_ignores_trailing_slash_on_base() {
        let with = SupabaseStorage::new("https://project.supabase.co/", "key").unwrap();
        let without = SupabaseStorage::new("https://project.supabase.co", "key").unwrap();
        assert_eq!(
            with.endpoint(&["storage/v1/object", "feedposts"]).unwrap(),
            without.endpoint(&["storage/v1/object", "feedposts"]).unwrap()
        );
    }
}
