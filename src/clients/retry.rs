//! Retry classification for upstream attempts.
//!
//! Kept free of any transport types so the policy can be tested without a
//! network.

use std::time::Duration;

/// HTTP statuses treated as transient.
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

const MAX_BACKOFF: Duration = Duration::from_secs(2);

/// What a single attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The provider answered with this HTTP status.
    Status(u16),
    /// The attempt hit the per-attempt timeout.
    Timeout,
    /// Connection, DNS or other transport failure.
    Network,
}

/// Decision for an attempt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Succeed,
    Retry,
    Fail,
}

/// Classify an attempt outcome.
pub fn classify(outcome: AttemptOutcome) -> RetryDecision {
    match outcome {
        AttemptOutcome::Status(status) if (200..300).contains(&status) => RetryDecision::Succeed,
        AttemptOutcome::Status(status) if RETRYABLE_STATUS_CODES.contains(&status) => {
            RetryDecision::Retry
        }
        AttemptOutcome::Status(_) => RetryDecision::Fail,
        AttemptOutcome::Timeout | AttemptOutcome::Network => RetryDecision::Retry,
    }
}

/// Bounded retry policy: `max_retries` extra attempts with linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Total attempts including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Decide what to do after `attempt` (1-based) produced `outcome`.
    pub fn decide(&self, attempt: u32, outcome: AttemptOutcome) -> RetryDecision {
        match classify(outcome) {
            RetryDecision::Retry if attempt >= self.max_attempts() => RetryDecision::Fail,
            decision => decision,
        }
    }

    /// Delay before the attempt that follows `attempt`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1, Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_statuses() {
        assert_eq!(classify(AttemptOutcome::Status(200)), RetryDecision::Succeed);
        assert_eq!(classify(AttemptOutcome::Status(204)), RetryDecision::Succeed);
        for status in RETRYABLE_STATUS_CODES {
            assert_eq!(classify(AttemptOutcome::Status(status)), RetryDecision::Retry);
        }
        assert_eq!(classify(AttemptOutcome::Status(400)), RetryDecision::Fail);
        assert_eq!(classify(AttemptOutcome::Status(401)), RetryDecision::Fail);
        assert_eq!(classify(AttemptOutcome::Status(404)), RetryDecision::Fail);
        assert_eq!(classify(AttemptOutcome::Status(501)), RetryDecision::Fail);
    }

    #[test]
    fn test_classify_transport_failures() {
        assert_eq!(classify(AttemptOutcome::Timeout), RetryDecision::Retry);
        assert_eq!(classify(AttemptOutcome::Network), RetryDecision::Retry);
    }

    #[test]
    fn test_policy_stops_after_last_attempt() {
        let policy = RetryPolicy::new(1, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 2);
        assert_eq!(
            policy.decide(1, AttemptOutcome::Status(500)),
            RetryDecision::Retry
        );
        assert_eq!(
            policy.decide(2, AttemptOutcome::Status(500)),
            RetryDecision::Fail
        );
        assert_eq!(
            policy.decide(1, AttemptOutcome::Status(400)),
            RetryDecision::Fail
        );
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.decide(1, AttemptOutcome::Timeout), RetryDecision::Fail);
    }

    #[test]
    fn test_backoff_is_linear_and_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(300));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(300));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(600));
        assert_eq!(policy.backoff_for(10), Duration::from_secs(2));
    }
}
