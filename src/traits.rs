//! Core traits for recognition clients.

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use url::Url;

use crate::error::RecognitionError;

/// An uploaded image as received from the caller.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub filename: String,
    /// Content type declared by the caller, if any.
    pub content_type: Option<String>,
}

/// What gets sent upstream: either the image bytes or a URL the provider fetches.
#[derive(Debug, Clone)]
pub enum ImageSource {
    File(ImageUpload),
    Url(Url),
}

impl ImageSource {
    /// Short name used in log lines.
    pub fn mode(&self) -> &'static str {
        match self {
            ImageSource::File(_) => "file",
            ImageSource::Url(_) => "url",
        }
    }
}

/// Trait for clients that forward images to an upstream recognition provider.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    /// Submit an image and return the raw JSON payload from the provider.
    ///
    /// Transient failures are retried internally; only the final outcome is
    /// returned.
    async fn recognize(
        &self,
        source: &ImageSource,
        request_id: &str,
    ) -> Result<Value, RecognitionError>;

    /// Fetch the provider's version document.
    async fn version(&self, request_id: &str) -> Result<Value, RecognitionError>;

    /// Get the provider name.
    fn provider_name(&self) -> &str;

    /// Check if the client has credentials to call the provider.
    fn is_available(&self) -> bool;
}
