//! Response normalization.
//!
//! Turns the provider's loosely structured payload into a sorted candidate
//! list. The payload is untrusted: every field is looked up explicitly and
//! entries that do not fit are skipped rather than failing the request.
//!
//! Expected shape:
//!
//! ```json
//! {
//!   "results": [
//!     {
//!       "status": { "code": "ok" },
//!       "entities": [
//!         { "kind": "classes", "classes": [{ "class": "Château Margaux 2015", "score": 0.91 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `classes` may also be an object mapping label to score.

use serde_json::{Map, Value};
use tracing::debug;

use crate::models::Candidate;

const LABEL_KEYS: &[&str] = &["class", "label", "name"];
const SCORE_KEYS: &[&str] = &["score", "confidence", "probability"];

/// Extract candidates from a raw provider payload, sorted by confidence
/// descending. Ties keep provider order.
///
/// A payload that signals a non-success status yields an empty list.
pub fn parse_candidates(raw: &Value) -> Vec<Candidate> {
    if !top_level_ok(raw) {
        debug!("Upstream payload reports non-success status: {:?}", raw.get("status"));
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let results = raw
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for result in results {
        if !result_ok(result) {
            debug!("Skipping result with status: {:?}", result.get("status"));
            continue;
        }

        let entities = result
            .get("entities")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for entity in entities {
            match entity.get("classes") {
                Some(Value::Array(items)) => {
                    candidates.extend(items.iter().filter_map(candidate_from_entry));
                }
                Some(Value::Object(map)) => {
                    candidates.extend(candidates_from_map(map));
                }
                _ => {}
            }
        }
    }

    sort_candidates(&mut candidates);
    candidates
}

/// Stable sort by confidence, highest first.
pub fn sort_candidates(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

fn top_level_ok(raw: &Value) -> bool {
    match raw.get("status") {
        None | Some(Value::Null) => true,
        Some(status) => status_code(status).is_some_and(|code| is_success(&code, false)),
    }
}

fn result_ok(result: &Value) -> bool {
    match result.get("status") {
        None | Some(Value::Null) => true,
        Some(status) => status_code(status).is_some_and(|code| is_success(&code, true)),
    }
}

/// Status may be a bare string or an object with a `code` field.
fn status_code(status: &Value) -> Option<String> {
    match status {
        Value::String(s) => Some(s.trim().to_ascii_lowercase()),
        Value::Object(map) => match map.get("code") {
            None | Some(Value::Null) => Some(String::new()),
            Some(Value::String(s)) => Some(s.trim().to_ascii_lowercase()),
            Some(_) => None,
        },
        _ => None,
    }
}

fn is_success(code: &str, allow_blank: bool) -> bool {
    matches!(code, "ok" | "success") || (allow_blank && code.is_empty())
}

fn candidate_from_entry(entry: &Value) -> Option<Candidate> {
    let object = entry.as_object()?;
    let label = LABEL_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(label_of))?;
    let confidence = SCORE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(score_of))?;
    Some(Candidate { label, confidence })
}

fn candidates_from_map(map: &Map<String, Value>) -> impl Iterator<Item = Candidate> + '_ {
    map.iter().filter_map(|(label, score)| {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(Candidate {
            label: label.to_string(),
            confidence: score_of(score)?,
        })
    })
}

fn label_of(value: &Value) -> Option<String> {
    let label = value.as_str()?.trim();
    (!label.is_empty()).then(|| label.to_string())
}

/// Numeric or numeric-string score within [0, 1].
fn score_of(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (score.is_finite() && (0.0..=1.0).contains(&score)).then_some(score)
}
