//! Image-host capability. Receipts upload before the expense record is
//! written, and the add flow treats any upload failure as "no image" rather
//! than blocking the insert.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;

/// Receipt payload carried in the add-expense draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("image upload failed: {0}")]
pub struct ImageHostError(String);

impl ImageHostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Hosted image uploads. `Ok(None)` means the host accepted the call but
/// returned no usable reference; callers proceed without an image either way.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, receipt: &ReceiptUpload) -> Result<Option<String>, ImageHostError>;
}

/// Unsigned-preset upload over HTTP: posts `file` plus `upload_preset` as
/// multipart form data and reads the hosted URL out of the JSON response.
pub struct HttpImageHost {
    client: reqwest::Client,
    endpoint: String,
    preset: String,
}

impl HttpImageHost {
    pub fn new(endpoint: impl Into<String>, preset: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            preset: preset.into(),
        }
    }
}

#[async_trait]
impl ImageHost for HttpImageHost {
    async fn upload(&self, receipt: &ReceiptUpload) -> Result<Option<String>, ImageHostError> {
        let part = Part::bytes(receipt.bytes.clone()).file_name(receipt.file_name.clone());
        let form = Form::new()
            .text("upload_preset", self.preset.clone())
            .part("file", part);
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ImageHostError::new(e.to_string()))?
            .error_for_status()
            .map_err(|e| ImageHostError::new(e.to_string()))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ImageHostError::new(e.to_string()))?;
        Ok(hosted_reference(&body))
    }
}

/// Pulls the hosted URL out of an upload response, preferring the TLS
/// variant. Missing or empty fields read as "no reference".
fn hosted_reference(body: &serde_json::Value) -> Option<String> {
    body.get("secure_url")
        .or_else(|| body.get("url"))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Stand-in when no image host is configured: every upload reports no
/// reference, so adds proceed without an attachment.
pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, receipt: &ReceiptUpload) -> Result<Option<String>, ImageHostError> {
        debug!(file = %receipt.file_name, "image host disabled, dropping receipt attachment");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hosted_reference_prefers_secure_url() {
        let body = json!({"secure_url": "https://img.example/a.png", "url": "http://img.example/a.png"});
        assert_eq!(
            hosted_reference(&body),
            Some("https://img.example/a.png".to_owned())
        );
    }

    #[test]
    fn hosted_reference_falls_back_to_plain_url() {
        let body = json!({"url": "http://img.example/b.png"});
        assert_eq!(
            hosted_reference(&body),
            Some("http://img.example/b.png".to_owned())
        );
    }

    #[test]
    fn missing_or_empty_references_read_as_none() {
        assert_eq!(hosted_reference(&json!({})), None);
        assert_eq!(hosted_reference(&json!({"secure_url": ""})), None);
        assert_eq!(hosted_reference(&json!({"secure_url": 7})), None);
    }

    #[tokio::test]
    async fn disabled_host_always_reports_no_reference() {
        let receipt = ReceiptUpload {
            file_name: "receipt.jpg".into(),
            bytes: vec![1, 2, 3],
        };
        assert_eq!(DisabledImageHost.upload(&receipt).await, Ok(None));
    }
}
