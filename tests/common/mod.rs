//! Shared fixtures for integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wine_recognition::{Config, UpstreamCredentials};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-key-123";
pub const TEST_API_HOST: &str = "wine-recognition2.p.rapidapi.com";

/// Minimal 1x1 PNG.
pub const TINY_PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\x00\x00\x00\x01\
\x00\x00\x00\x01\x08\x02\x00\x00\x00\x90wS\xde\x00\x00\
\x00\x0cIDATx\x9cc\xf8\x0f\x00\x00\x01\x01\x00\x05\x18\
\xd8N\x00\x00\x00\x00IEND\xaeB`\x82";

/// Config pointed at the mock provider with credentials and no backoff.
pub fn config_for(server: &MockServer) -> Config {
    Config {
        credentials: UpstreamCredentials::new(TEST_API_KEY, TEST_API_HOST),
        rapidapi_base_url: server.uri(),
        timeout_seconds: 2.0,
        retry_backoff_ms: 0,
        ..Config::default()
    }
}

/// Config pointed at the mock provider without credentials.
pub fn unconfigured_for(server: &MockServer) -> Config {
    Config {
        credentials: None,
        ..config_for(server)
    }
}

/// Provider payload with three wine candidates.
pub fn wine_payload() -> Value {
    json!({
        "results": [{
            "status": { "code": "ok", "message": "Success" },
            "name": "label.png",
            "entities": [{
                "kind": "classes",
                "name": "wine-labels",
                "classes": [
                    { "class": "Château Margaux 2015", "score": 0.92 },
                    { "class": "Château Latour 2016", "score": 0.75 },
                    { "class": "Penfolds Grange 2018", "score": 0.61 }
                ]
            }]
        }]
    })
}

/// Provider payload with five candidates in shuffled confidence order.
pub fn five_candidate_payload() -> Value {
    json!({
        "results": [{
            "status": { "code": "ok" },
            "entities": [{
                "kind": "classes",
                "classes": [
                    { "class": "Rioja Reserva", "score": 0.2 },
                    { "class": "Barolo 2016", "score": 0.9 },
                    { "class": "Chianti Classico", "score": 0.5 },
                    { "class": "Brunello 2015", "score": 0.9 },
                    { "class": "Vinho Verde", "score": 0.1 }
                ]
            }]
        }]
    })
}
