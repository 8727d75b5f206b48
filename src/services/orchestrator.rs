//! Recognition orchestrator service.
//!
//! Sequences validation, the upstream call and normalization for both entry
//! points and assembles the unified response.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::RecognitionError;
use crate::models::RecognitionResult;
use crate::services::normalizer::parse_candidates;
use crate::services::validator::{InputValidator, RecognizeOptions};
use crate::traits::{ImageSource, ImageUpload, RecognitionClient};

/// The main orchestrator in front of the upstream recognition client.
pub struct RecognitionOrchestrator {
    client: Arc<dyn RecognitionClient>,
    validator: InputValidator,
}

impl RecognitionOrchestrator {
    /// Create a new orchestrator around a shared client.
    pub fn new(client: Arc<dyn RecognitionClient>, config: &Config) -> Self {
        Self {
            client,
            validator: InputValidator::new(config),
        }
    }

    pub fn validator(&self) -> &InputValidator {
        &self.validator
    }

    /// Whether the upstream client has credentials.
    pub fn is_ready(&self) -> bool {
        self.client.is_available()
    }

    /// Recognize an uploaded image file.
    pub async fn recognize_file(
        &self,
        upload: ImageUpload,
        options: RecognizeOptions,
    ) -> Result<RecognitionResult, RecognitionError> {
        let request_id = Uuid::new_v4();
        info!(
            "File upload received | request_id={} filename={} size_bytes={} content_type={:?}",
            request_id,
            upload.filename,
            upload.bytes.len(),
            upload.content_type
        );

        self.validator.validate_upload(&upload)?;
        self.run(request_id, ImageSource::File(upload), options).await
    }

    /// Recognize an image the provider fetches from `image_url`.
    pub async fn recognize_url(
        &self,
        image_url: &str,
        options: RecognizeOptions,
    ) -> Result<RecognitionResult, RecognitionError> {
        let request_id = Uuid::new_v4();
        info!(
            "URL recognition request | request_id={} url={}",
            request_id, image_url
        );

        let url = self.validator.validate_url(image_url)?;
        self.run(request_id, ImageSource::Url(url), options).await
    }

    /// Fetch the provider's version document.
    pub async fn upstream_version(&self) -> Result<Value, RecognitionError> {
        let request_id = Uuid::new_v4().to_string();
        self.client.version(&request_id).await
    }

    async fn run(
        &self,
        request_id: Uuid,
        source: ImageSource,
        options: RecognizeOptions,
    ) -> Result<RecognitionResult, RecognitionError> {
        let started = Instant::now();
        let raw = self
            .client
            .recognize(&source, &request_id.to_string())
            .await?;
        let mut candidates = parse_candidates(&raw);
        let elapsed_ms = round2(started.elapsed().as_secs_f64() * 1000.0);

        candidates.truncate(options.top_k);

        info!(
            "Recognition complete | request_id={} mode={} candidates={} elapsed_ms={:.1}",
            request_id,
            source.mode(),
            candidates.len(),
            elapsed_ms
        );

        Ok(RecognitionResult {
            request_id,
            candidate_count: candidates.len(),
            top_candidates: candidates,
            elapsed_ms,
            raw_response: options.include_raw.then_some(raw),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
