//! RapidAPI wine-recognition client.
//!
//! Sends multipart uploads or JSON url submissions to the provider, retries
//! transient failures, and hands back the raw JSON payload.

use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::clients::retry::{AttemptOutcome, RetryDecision, RetryPolicy};
use crate::config::{Config, UpstreamCredentials};
use crate::error::RecognitionError;
use crate::traits::{ImageSource, ImageUpload, RecognitionClient};

const API_KEY_HEADER: &str = "X-RapidAPI-Key";
const API_HOST_HEADER: &str = "X-RapidAPI-Host";
const BODY_SNIPPET_LEN: usize = 200;

/// RapidAPI recognition client.
///
/// Holds one pooled `reqwest::Client`; build it once and share it.
pub struct RapidApiClient {
    client: Client,
    credentials: Option<UpstreamCredentials>,
    base_url: String,
    results_path: String,
    version_path: String,
    timeout: std::time::Duration,
    policy: RetryPolicy,
}

impl RapidApiClient {
    /// Create a new client from the service configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("wine-recognition/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.timeout())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing HTTP client handle.
    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            credentials: config.credentials.clone(),
            base_url: config.rapidapi_base_url.trim_end_matches('/').to_string(),
            results_path: config.rapidapi_results_path.clone(),
            version_path: config.rapidapi_version_path.clone(),
            timeout: config.timeout(),
            policy: RetryPolicy::new(
                config.max_retries,
                std::time::Duration::from_millis(config.retry_backoff_ms),
            ),
        }
    }

    fn results_url(&self) -> String {
        format!("{}{}", self.base_url, self.results_path)
    }

    fn version_url(&self) -> String {
        format!("{}{}", self.base_url, self.version_path)
    }

    /// Run one attempt to completion, including reading the body.
    async fn execute(request: RequestBuilder) -> Result<(u16, bytes::Bytes), reqwest::Error> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok((status, body))
    }

    /// Send the request built by `build`, retrying transient failures.
    async fn send_with_retry<F>(&self, request_id: &str, build: F) -> Result<Value, RecognitionError>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(RecognitionError::Configuration)?;

        let started = Instant::now();
        let mut attempt: u32 = 0;
        let mut timed_out: u32 = 0;

        let (final_status, result) = loop {
            attempt += 1;
            let request = build(&self.client)
                .header(API_KEY_HEADER, &credentials.api_key)
                .header(API_HOST_HEADER, &credentials.api_host)
                .timeout(self.timeout);

            let outcome = Self::execute(request).await;
            let kind = match &outcome {
                Ok((status, _)) => AttemptOutcome::Status(*status),
                Err(e) if e.is_timeout() => AttemptOutcome::Timeout,
                Err(_) => AttemptOutcome::Network,
            };
            if kind == AttemptOutcome::Timeout {
                timed_out += 1;
            }

            match (self.policy.decide(attempt, kind), outcome) {
                (RetryDecision::Succeed, Ok((status, body))) => {
                    break (Some(status), parse_payload(status, &body));
                }
                (RetryDecision::Retry, _) => {
                    warn!(
                        request_id,
                        attempt,
                        max_attempts = self.policy.max_attempts(),
                        outcome = ?kind,
                        "Transient upstream failure, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff_for(attempt)).await;
                }
                (_, Ok((status, body))) => {
                    warn!(
                        "Upstream rejected request | request_id={} status={} body={:?}",
                        request_id,
                        status,
                        body_snippet(&body)
                    );
                    break (Some(status), Err(status_error(status)));
                }
                (_, Err(e)) => {
                    let err = if e.is_timeout() {
                        RecognitionError::UpstreamTimeout {
                            timed_out,
                            attempts: attempt,
                        }
                    } else {
                        RecognitionError::Network(e.without_url().to_string())
                    };
                    break (None, Err(err));
                }
            }
        };

        info!(
            request_id,
            attempts = attempt,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            upstream_status = ?final_status,
            success = result.is_ok(),
            "Upstream call finished"
        );

        result
    }
}

#[async_trait]
impl RecognitionClient for RapidApiClient {
    async fn recognize(
        &self,
        source: &ImageSource,
        request_id: &str,
    ) -> Result<Value, RecognitionError> {
        let url = self.results_url();
        match source {
            ImageSource::File(upload) => {
                self.send_with_retry(request_id, |client| {
                    let form = Form::new().part("image", image_part(upload));
                    client.post(&url).multipart(form)
                })
                .await
            }
            ImageSource::Url(image_url) => {
                let body = json!({ "url": image_url.as_str() });
                self.send_with_retry(request_id, |client| client.post(&url).json(&body))
                    .await
            }
        }
    }

    async fn version(&self, request_id: &str) -> Result<Value, RecognitionError> {
        let url = self.version_url();
        self.send_with_retry(request_id, |client| client.get(&url))
            .await
    }

    fn provider_name(&self) -> &str {
        "rapidapi"
    }

    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }
}

/// Build the multipart part for an upload. Bytes are reference counted, so
/// rebuilding per attempt does not copy the image.
fn image_part(upload: &ImageUpload) -> Part {
    let mime = upload
        .content_type
        .clone()
        .unwrap_or_else(|| "image/jpeg".to_string());
    let make = || {
        Part::stream_with_length(upload.bytes.clone(), upload.bytes.len() as u64)
            .file_name(upload.filename.clone())
    };
    make().mime_str(&mime).unwrap_or_else(|_| make())
}

fn parse_payload(status: u16, body: &[u8]) -> Result<Value, RecognitionError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| RecognitionError::Upstream {
        status,
        message: format!("response body is not valid JSON ({})", e),
    })?;
    if !value.is_object() {
        return Err(RecognitionError::Upstream {
            status,
            message: "response body is not a JSON object".to_string(),
        });
    }
    Ok(value)
}

fn status_error(status: u16) -> RecognitionError {
    let reason = StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unexpected status");
    RecognitionError::Upstream {
        status,
        message: reason.to_string(),
    }
}

fn body_snippet(body: &[u8]) -> String {
    String::from_utf8_lossy(body)
        .chars()
        .take(BODY_SNIPPET_LEN)
        .collect()
}
