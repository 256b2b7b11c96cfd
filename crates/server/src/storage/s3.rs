//! S3-compatible backend.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use secrecy::ExposeSecret;

use super::{ObjectStore, StorageError, check_key};
use crate::config::S3Config;

/// Stores objects in an S3-compatible bucket with path-style addressing.
///
/// Public URLs are `<public base>/<key>`.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3ObjectStore {
    /// Build a client for the configured endpoint.
    pub async fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.expose_secret().to_string(),
            None,
            None,
            "trailforge-env",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        tracing::info!(bucket = %config.bucket, endpoint = %config.endpoint, "S3 client initialized");

        Self::with_client(S3Client::from_conf(s3_config), &config.bucket, &config.public_url)
    }

    /// Wrap an existing client.
    #[must_use]
    pub fn with_client(client: S3Client, bucket: &str, public_url: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Object key behind a public URL, if the URL lives under `public_url`.
fn key_for<'a>(public_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(public_url)?
        .strip_prefix('/')
        .filter(|key| !key.is_empty() && !key.contains(".."))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn backend(&self) -> &'static str {
        "s3"
    }

    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        check_key(key)?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;

        Ok(format!("{}/{key}", self.public_url))
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        let key = key_for(&self.public_url, url)
            .ok_or_else(|| StorageError::NotOwned(url.to_string()))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::S3(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    fn owns(&self, url: &str) -> bool {
        key_for(&self.public_url, url).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cdn.example.org";

    #[test]
    fn test_owns_only_public_base_urls() {
        assert!(key_for(BASE, "https://cdn.example.org/uploads/a.png").is_some());
        assert!(key_for(BASE, "https://cdn.example.org.evil.test/uploads/a.png").is_none());
        assert!(key_for(BASE, "https://cdn.example.org/").is_none());
        assert!(key_for(BASE, "/uploads/a.png").is_none());
        assert!(key_for(BASE, "https://cdn.example.org/uploads/../x").is_none());
    }

    #[test]
    fn test_key_strips_public_base() {
        assert_eq!(
            key_for(BASE, "https://cdn.example.org/uploads/a.png"),
            Some("uploads/a.png")
        );
    }
}
