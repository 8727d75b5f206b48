//! Router assembly: routes, body limit, tracing and CORS.

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::handlers::{self, AppState};

/// Extra room for multipart boundaries and headers on top of the file ceiling.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the HTTP router for the service.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_file_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let cors = cors_layer(&state.config);

    Router::new()
        // Probes
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness))
        // Upstream passthrough
        .route("/api/v1/version", get(handlers::api_version))
        // Recognition endpoints
        .route("/api/v1/recognize/file", post(handlers::recognize_file))
        .route("/api/v1/recognize/url", post(handlers::recognize_url))
        // State
        .with_state(state)
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS from `FRONTEND_ORIGIN`. A wildcard allows any origin without
/// credentials; an explicit list allows credentials.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = config.allowed_origins();
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let values: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(values))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
