//! Backoff policy: which statuses are worth retrying, and how long to wait.

use rand::Rng;
use std::time::Duration;

/// Returns true for HTTP statuses that should be retried (429, 503).
///
/// Every other 4xx/5xx is terminal.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 503)
}

/// Exponential backoff with jitter: `base * 2^attempt + uniform(0, base)`.
///
/// No upper cap; the number of retries is bounded by the caller.
pub fn compute_backoff(attempt: u32, base: Duration) -> Duration {
    let exponential = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter = base.mul_f64(rand::rng().random::<f64>());
    exponential.saturating_add(jitter)
}
