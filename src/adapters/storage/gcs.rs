//! Google Cloud Storage blob store
//!
//! Uses the JSON API: simple media uploads for writes and `alt=media`
//! downloads for reads, authenticated with a bearer token.

use super::traits::{validate_path, BlobStore};
use crate::config::{GcsStorageConfig, SecretString};
use crate::domain::{OrderSyncError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Blob store backed by a GCS bucket
pub struct GcsBlobStore {
    client: Client,
    bucket: String,
    endpoint: String,
    access_token: SecretString,
}

impl GcsBlobStore {
    /// Creates a store for the configured bucket
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built.
    pub fn new(config: &GcsStorageConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                OrderSyncError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }
}

/// Percent-encodes an object name for use as a single path segment
fn encode_object_name(name: &str) -> String {
    url::form_urlencoded::byte_serialize(name.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("csv") => "text/csv",
        Some("xml") => "application/xml",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        validate_path(path)?;

        let url = format!("{}/upload/storage/v1/b/{}/o", self.endpoint, self.bucket);
        let size = data.len();
        let response = self
            .client
            .post(&url)
            .query(&[("uploadType", "media"), ("name", path)])
            .bearer_auth(self.access_token.expose_secret())
            .header(reqwest::header::CONTENT_TYPE, content_type(path))
            .body(data)
            .send()
            .await
            .map_err(|e| OrderSyncError::Transport(format!("Upload of {path} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OrderSyncError::Storage(format!(
                "Upload of {path} failed with status {status}: {error_text}"
            )));
        }

        tracing::debug!(bucket = %self.bucket, path = %path, bytes = size, "Uploaded object");
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Bytes> {
        validate_path(path)?;

        let url = format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            self.bucket,
            encode_object_name(path)
        );
        let response = self
            .client
            .get(&url)
            .query(&[("alt", "media")])
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| OrderSyncError::Transport(format!("Download of {path} failed: {e}")))?;

        match response.status() {
            status if status.is_success() => response.bytes().await.map_err(|e| {
                OrderSyncError::Transport(format!("Failed to read body of {path}: {e}"))
            }),
            StatusCode::NOT_FOUND => Err(OrderSyncError::not_found("object", self.location(path))),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(OrderSyncError::Storage(format!(
                    "Download of {path} failed with status {status}: {error_text}"
                )))
            }
        }
    }

    fn location(&self, path: &str) -> String {
        format!("gs://{}/{}", self.bucket, path)
    }
}
