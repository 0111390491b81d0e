use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::primitives::ByteStream;
use chrono::Utc;
use thiserror::Error;

use crate::config::StorageConfig;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Remote fetch failed: {0}")]
    FetchFailed(String),
}

/// Gateway to the owned object-storage bucket. Objects are publicly readable
/// under `public_base_url` via a bucket-level read policy set once out of
/// band, so no per-object ACL step is needed.
#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
    http: reqwest::Client,
}

impl MediaStore {
    pub fn new(config: &StorageConfig, http: reqwest::Client) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "voxvid",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Upload bytes under the given key and return the public URL.
    /// Idempotent per key: re-putting the same key overwrites in place.
    pub async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        tracing::debug!("Uploading {} bytes to {key}", data.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(self.public_url(key))
    }

    /// Fetch a remote URL's bytes and store them under the given key.
    pub async fn put_from_remote_url(&self, url: &str, key: &str) -> StorageResult<String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| StorageError::FetchFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(StorageError::FetchFailed(format!(
                "{url} returned {}",
                resp.status()
            )));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| StorageError::FetchFailed(e.to_string()))?;

        self.upload_bytes(bytes.to_vec(), key, &content_type).await
    }

    /// Collision-resistant key: timestamp plus random suffix, preserving the
    /// original file extension.
    pub fn generate_key(folder: &str, filename: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let suffix = hex::encode(rand::random::<[u8; 4]>());
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{ext}"))
            .unwrap_or_default();
        format!("{folder}/{millis}_{suffix}{ext}")
    }

    /// Deterministic public URL for a key.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }

    /// Whether a URL points into owned storage rather than a vendor's
    /// transient hosting.
    pub fn is_owned(&self, url: &str) -> bool {
        url.starts_with(&self.public_base_url)
    }
}
