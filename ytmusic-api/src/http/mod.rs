//! Request layer: backoff policy, in-flight deduplication and the resilient
//! transport that composes them.

pub mod client;
pub mod dedup;
pub mod retry;

pub use client::{HttpClient, RawResponse, TransportFailure};
pub use dedup::RequestDeduplicator;
pub use retry::{compute_backoff, is_retryable_status};
