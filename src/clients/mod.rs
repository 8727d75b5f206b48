//! Upstream recognition clients module.

pub mod rapidapi;
pub mod retry;

pub use rapidapi::RapidApiClient;
pub use retry::{classify, AttemptOutcome, RetryDecision, RetryPolicy};
