//! Product image upload to Cloudinary.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const CLOUDINARY_API: &str = "https://api.cloudinary.com/v1_1";

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("No file provided")]
    NoFile,

    #[error("media service not configured")]
    NotConfigured,

    #[error("invalid upload request: {0}")]
    Multipart(String),

    #[error("media service unreachable: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media service rejected upload: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    pub public_id: String,
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedMedia, MediaError>;
}

#[derive(Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl std::fmt::Debug for CloudinaryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .finish()
    }
}

pub struct CloudinaryUploader {
    client: reqwest::Client,
    credentials: CloudinaryCredentials,
    folder: String,
}

#[derive(Deserialize)]
struct CloudinaryResponse { secure_url: String, public_id: String }

#[derive(Deserialize)]
struct CloudinaryErrorBody { error: CloudinaryErrorMessage }

#[derive(Deserialize)]
struct CloudinaryErrorMessage { message: String }

/// Hex SHA-256 over the alphabetically ordered signed params followed by the secret.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut params = params.to_vec();
    params.sort_by_key(|(k, _)| *k);
    let joined = params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");
    format!("{:x}", Sha256::digest(format!("{joined}{secret}").as_bytes()))
}

impl CloudinaryUploader {
    pub fn new(credentials: CloudinaryCredentials, folder: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), credentials, folder: folder.into() }
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedMedia, MediaError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(&[("folder", self.folder.as_str()), ("timestamp", timestamp.as_str())], &self.credentials.api_secret);
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("api_key", self.credentials.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.folder.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!("{CLOUDINARY_API}/{}/auto/upload", self.credentials.cloud_name);
        let response = self.client.post(url).multipart(form).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<CloudinaryErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => status.to_string(),
            };
            return Err(MediaError::Rejected(message));
        }
        let body: CloudinaryResponse = response.json().await?;
        tracing::info!(public_id = %body.public_id, "uploaded product image");
        Ok(UploadedMedia { url: body.secure_url, public_id: body.public_id })
    }
}

/// Used when no Cloudinary credentials are configured.
pub struct UnconfiguredUploader;

#[async_trait]
impl MediaUploader for UnconfiguredUploader {
    async fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<UploadedMedia, MediaError> {
        Err(MediaError::NotConfigured)
    }
}
