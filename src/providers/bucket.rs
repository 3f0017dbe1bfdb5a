use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use super::base::{BlobStore, FileMetadata};
use super::configs::BucketConfig;
use crate::errors::{DialError, DialResult};

const API_KEY_HEADER: &str = "Api-Key";

#[derive(Debug, Deserialize)]
struct BucketInfo {
    bucket: String,
}

/// An open session against the gateway's file storage.
///
/// Opening the session resolves the caller's bucket. The gateway keeps no
/// server-side session state, so releasing it means dropping the HTTP client;
/// [`DialBucketClient::close`] just ends the session at a visible point.
pub struct DialBucketClient {
    client: Client,
    config: BucketConfig,
    bucket: String,
}

impl DialBucketClient {
    pub async fn open(config: BucketConfig) -> DialResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DialError::Storage(format!("Could not build HTTP client: {}", e)))?;

        let url = format!("{}/v1/bucket", config.host.trim_end_matches('/'));
        let response = client
            .get(&url)
            .header(API_KEY_HEADER, &config.api_key)
            .send()
            .await
            .map_err(|e| DialError::Storage(format!("Bucket lookup failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response.text().await.unwrap_or_default();
            return Err(DialError::Storage(format!(
                "Bucket lookup failed: {}: {}",
                status, err_text
            )));
        }

        let info: BucketInfo = response
            .json()
            .await
            .map_err(|e| DialError::Storage(format!("Malformed bucket response: {}", e)))?;

        debug!(bucket = %info.bucket, "bucket session opened");
        Ok(Self {
            client,
            config,
            bucket: info.bucket,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Drop the session and its HTTP client
    pub fn close(self) {
        drop(self);
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1/{}",
            self.config.host.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl BlobStore for DialBucketClient {
    async fn put(
        &mut self,
        name: &str,
        mime_type: &str,
        content: Vec<u8>,
    ) -> DialResult<FileMetadata> {
        if name.is_empty() {
            return Err(DialError::InvalidRequest(
                "File name must not be empty".to_string(),
            ));
        }

        let size = content.len();
        let part = Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| DialError::InvalidRequest(format!("Invalid MIME type {}: {}", mime_type, e)))?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(&format!(
            "files/{}/{}",
            self.bucket,
            urlencoding::encode(name)
        ));
        let response = self
            .client
            .put(&url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DialError::Storage(format!("Upload of {} failed: {}", name, e)))?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response.text().await.unwrap_or_default();
            return Err(DialError::Storage(format!(
                "Upload of {} rejected: {}: {}",
                name, status, err_text
            )));
        }

        let metadata: FileMetadata = response.json().await.map_err(|e| {
            DialError::Storage(format!("Upload of {} returned no usable url: {}", name, e))
        })?;

        info!(file = name, bytes = size, url = %metadata.url, "file staged");
        Ok(metadata)
    }

    async fn get(&mut self, url: &str) -> DialResult<Vec<u8>> {
        let endpoint = self.endpoint(url);
        let response = self
            .client
            .get(&endpoint)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(|e| DialError::Storage(format!("Download of {} failed: {}", url, e)))?;

        match response.status() {
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(|e| {
                    DialError::Storage(format!("Download of {} interrupted: {}", url, e))
                })?;
                debug!(url, bytes = bytes.len(), "file downloaded");
                Ok(bytes.to_vec())
            }
            StatusCode::NOT_FOUND => Err(DialError::NotFound(url.to_string())),
            status => {
                let err_text = response.text().await.unwrap_or_default();
                Err(DialError::Storage(format!(
                    "Download of {} failed: {}: {}",
                    url, status, err_text
                )))
            }
        }
    }
}

impl Drop for DialBucketClient {
    fn drop(&mut self) {
        debug!(bucket = %self.bucket, "bucket session released");
    }
}
