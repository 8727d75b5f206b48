//! API models for request/response types.
//!
//! Defines the JSON request/response structures for the recognition API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body accepted by `POST /api/v1/recognize/url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRecognizeRequest {
    /// Publicly reachable URL of the wine-label image.
    pub url: String,
}

/// Query parameters shared by both recognition endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecognizeQuery {
    /// Maximum candidates to return.
    #[serde(default)]
    pub top_k: Option<usize>,
    /// Include the full upstream JSON in the response.
    #[serde(default)]
    pub include_raw: Option<bool>,
}

/// A single label-recognition candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Human-readable wine name / label text.
    pub label: String,
    /// Confidence score in the [0, 1] range.
    pub confidence: f64,
}

/// Unified response returned by both the file and url endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub request_id: Uuid,
    /// Top-K candidates ordered by confidence (descending).
    pub top_candidates: Vec<Candidate>,
    /// Number of candidates in `top_candidates`.
    pub candidate_count: usize,
    /// Upstream call plus normalization time.
    pub elapsed_ms: f64,
    /// Raw upstream JSON, only present when `include_raw=true`.
    pub raw_response: Option<serde_json::Value>,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Liveness probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Readiness probe response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
