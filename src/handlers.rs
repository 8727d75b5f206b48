//! HTTP handlers module.
//!
//! Thin adapters between axum extractors and the recognition orchestrator.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::clients::RapidApiClient;
use crate::config::Config;
use crate::error::{RecognitionError, ValidationError};
use crate::models::{
    HealthResponse, ReadyResponse, RecognitionResult, RecognizeQuery, UrlRecognizeRequest,
};
use crate::services::{RecognitionOrchestrator, RecognizeOptions};
use crate::traits::{ImageUpload, RecognitionClient};

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Application state shared across handlers.
pub struct AppState {
    pub orchestrator: Arc<RecognitionOrchestrator>,
    pub config: Config,
}

impl AppState {
    /// Build the state with the RapidAPI client.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = RapidApiClient::new(&config)?;
        Ok(Self::with_client(Arc::new(client), config))
    }

    /// Build the state around any recognition client.
    pub fn with_client(client: Arc<dyn RecognitionClient>, config: Config) -> Self {
        Self {
            orchestrator: Arc::new(RecognitionOrchestrator::new(client, &config)),
            config,
        }
    }
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe: fails while credentials are missing.
pub async fn readiness(State(state): State<Arc<AppState>>) -> Response {
    if !state.orchestrator.is_ready() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyResponse {
                status: "not_ready".to_string(),
                reason: Some("RapidAPI credentials missing.".to_string()),
            }),
        )
            .into_response();
    }

    Json(ReadyResponse {
        status: "ready".to_string(),
        reason: None,
    })
    .into_response()
}

/// Upstream API version passthrough.
pub async fn api_version(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, RecognitionError> {
    state.orchestrator.upstream_version().await.map(Json)
}

/// Recognize a wine label from an uploaded image file.
pub async fn recognize_file(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RecognizeQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RecognitionResult>, RecognitionError> {
    let options = resolve_options(&state, query)?;
    let mut multipart =
        multipart.map_err(|e| ValidationError::MalformedUpload(e.body_text()))?;
    let upload = read_upload(&mut multipart, state.config.max_file_size_bytes).await?;

    state
        .orchestrator
        .recognize_file(upload, options)
        .await
        .map(Json)
}

/// Recognize a wine label from a publicly reachable image URL.
pub async fn recognize_url(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RecognizeQuery>, QueryRejection>,
    body: Result<Json<UrlRecognizeRequest>, JsonRejection>,
) -> Result<Json<RecognitionResult>, RecognitionError> {
    let options = resolve_options(&state, query)?;
    let Json(body) = body.map_err(|e| ValidationError::InvalidRequest(e.body_text()))?;

    state
        .orchestrator
        .recognize_url(&body.url, options)
        .await
        .map(Json)
}

fn resolve_options(
    state: &AppState,
    query: Result<Query<RecognizeQuery>, QueryRejection>,
) -> Result<RecognizeOptions, ValidationError> {
    let Query(query) = query.map_err(|e| ValidationError::InvalidRequest(e.body_text()))?;
    state
        .orchestrator
        .validator()
        .resolve_options(query.top_k, query.include_raw)
}

/// Pull the `file` field out of the multipart body. Other fields are ignored.
async fn read_upload(
    multipart: &mut Multipart,
    max_file_size_bytes: usize,
) -> Result<ImageUpload, ValidationError> {
    let to_validation = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ValidationError::BodyTooLarge {
                limit: max_file_size_bytes,
            }
        } else {
            warn!("Failed to read multipart upload: {}", e);
            ValidationError::MalformedUpload(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(to_validation)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(to_validation)?;

        return Ok(ImageUpload {
            bytes,
            filename,
            content_type,
        });
    }

    Err(ValidationError::MissingFile)
}
