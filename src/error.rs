//! Error taxonomy for the recognition pipeline.
//!
//! Every failure is mapped to one externally visible status and a single
//! `detail` string. Upstream payloads and credentials never reach the detail.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Input rejected before any upstream call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Uploaded file is empty.")]
    EmptyFile,

    #[error("Unsupported file extension '{extension}'. Allowed: {}", .allowed.join(", "))]
    UnsupportedExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Unsupported content type '{content_type}'. Allowed: {}", .allowed.join(", "))]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error(
        "File too large: {}. Maximum allowed: {}.",
        human_size(.size),
        human_size(.limit)
    )]
    FileTooLarge { size: usize, limit: usize },

    #[error("File too large. Maximum allowed: {}.", human_size(.limit))]
    BodyTooLarge { limit: usize },

    #[error("No file provided. Send the image in a multipart field named 'file'.")]
    MissingFile,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    #[error("top_k must be between 1 and {max}, got {value}.")]
    TopKOutOfRange { value: usize, max: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

const MIB: usize = 1024 * 1024;

/// `10485760` -> `10.0 MB`; sizes under 1 MiB stay in bytes.
fn human_size(bytes: &usize) -> String {
    if *bytes >= MIB {
        format!("{:.1} MB", *bytes as f64 / MIB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Errors produced by the recognition pipeline.
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("RapidAPI credentials are not configured on this server.")]
    Configuration,

    #[error("upstream request timed out on {timed_out} of {attempts} attempt(s)")]
    UpstreamTimeout { timed_out: u32, attempts: u32 },

    #[error("upstream returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("network error contacting upstream: {0}")]
    Network(String),
}

impl RecognitionError {
    /// External HTTP status for this error kind.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecognitionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RecognitionError::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            RecognitionError::UpstreamTimeout { .. }
            | RecognitionError::Upstream { .. }
            | RecognitionError::Network(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Human-readable detail returned to callers.
    pub fn detail(&self) -> String {
        match self {
            RecognitionError::Validation(_) | RecognitionError::Configuration => self.to_string(),
            _ => format!("Upstream recognition API error: {}", self),
        }
    }

    /// Whether the failure originated at or beyond the upstream boundary.
    pub fn is_upstream(&self) -> bool {
        self.status_code() == StatusCode::BAD_GATEWAY
    }
}

impl IntoResponse for RecognitionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_upstream() {
            error!("Upstream failure surfaced to caller: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}
