// src/repositories/picture_storage_repo.rs
use actix_web::web::Bytes;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use thiserror::Error;
use urlencoding::encode;
use uuid::Uuid;

/// Shared fallback image for users without a picture.
pub const DEFAULT_PICTURE_KEY: &str = "default.png";

pub fn profile_picture_key(user_id: Uuid) -> String {
    format!("{}.jpg", user_id)
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("storage rejected upload: {0} -> {1}")]
    Rejected(u16, String),
    #[error("service role key is not a valid header value")]
    InvalidKey,
}

/// Key-addressed blob store. Uploading to an existing key overwrites it.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;
}

/// Supabase Storage bucket (`/storage/v1/object/{bucket}/{key}`).
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    storage_url: String,
    bucket: String,
    service_role_key: String,
}

impl SupabaseStorage {
    pub fn new(client: Client, supabase_url: &str, bucket: &str, service_role_key: &str) -> Self {
        Self {
            client,
            storage_url: format!("{}/storage/v1", supabase_url.trim_end_matches('/')),
            bucket: bucket.to_string(),
            service_role_key: service_role_key.to_string(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.storage_url, encode(&self.bucket), encode(key))
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, StorageError> {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
        let invalid = |_| StorageError::InvalidKey;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", HeaderValue::from_str(&self.service_role_key).map_err(invalid)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_role_key)).map_err(invalid)?,
        );
        headers.insert("x-upsert", HeaderValue::from_static("true"));
        Ok(headers)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn upload(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        let url = self.object_url(key);
        debug!("uploading {} bytes to {}", bytes.len(), url);

        let resp = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(StorageError::Rejected(status.as_u16(), text));
        }
        Ok(())
    }
}
