//! forge::rate_limit
//!
//! Tracks the `X-RateLimit-*` headers GitHub returns on every response so
//! callers can see how much budget is left without spending a request on
//! `GET /rate_limit`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use reqwest::header::HeaderMap;
use tracing::debug;

/// Shared rate-limit state updated after every API response.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    /// Remaining calls before the window resets (`u64::MAX` until observed).
    remaining: Arc<AtomicU64>,
    /// Unix timestamp at which the window resets.
    reset_at: Arc<AtomicU64>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitState {
    pub fn new() -> Self {
        Self {
            remaining: Arc::new(AtomicU64::new(u64::MAX)),
            reset_at: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Remaining calls, if a response has reported them yet.
    pub fn remaining(&self) -> Option<u64> {
        match self.remaining.load(Ordering::Relaxed) {
            u64::MAX => None,
            n => Some(n),
        }
    }

    /// Unix timestamp when the window resets, if reported.
    pub fn reset_at(&self) -> Option<u64> {
        match self.reset_at.load(Ordering::Relaxed) {
            0 => None,
            n => Some(n),
        }
    }

    /// Update state from response headers.
    pub fn update_from_headers(&self, headers: &HeaderMap) {
        let (remaining, reset) = parse_headers(headers);

        if let Some(r) = remaining {
            self.remaining.store(r, Ordering::Relaxed);
        }
        if let Some(r) = reset {
            self.reset_at.store(r, Ordering::Relaxed);
        }
        if remaining == Some(0) {
            debug!(reset = ?reset, "rate limit exhausted");
        }
    }
}

/// Extract `(remaining, reset)` from `X-RateLimit-*` headers.
pub(crate) fn parse_headers(headers: &HeaderMap) -> (Option<u64>, Option<u64>) {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };
    (read("X-RateLimit-Remaining"), read("X-RateLimit-Reset"))
}

/// Seconds from a `Retry-After` header, sent with secondary rate limits.
///
/// Only the delta-seconds form is recognized; GitHub never sends an HTTP date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn unobserved_state_is_empty() {
        let state = RateLimitState::new();
        assert_eq!(state.remaining(), None);
        assert_eq!(state.reset_at(), None);
    }

    #[test]
    fn updates_from_headers() {
        let state = RateLimitState::new();
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("4321"));
        headers.insert("X-RateLimit-Reset", HeaderValue::from_static("1700000000"));

        state.update_from_headers(&headers);

        assert_eq!(state.remaining(), Some(4321));
        assert_eq!(state.reset_at(), Some(1_700_000_000));
    }

    #[test]
    fn ignores_garbage_and_keeps_previous() {
        let state = RateLimitState::new();
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("10"));
        state.update_from_headers(&headers);

        let mut bad = HeaderMap::new();
        bad.insert("X-RateLimit-Remaining", HeaderValue::from_static("lots"));
        state.update_from_headers(&bad);

        assert_eq!(state.remaining(), Some(10));
    }

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert("Retry-After", HeaderValue::from_static("60"));
        assert_eq!(parse_retry_after(&headers), Some(60));

        headers.insert(
            "Retry-After",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn clones_share_state() {
        let state = RateLimitState::new();
        let clone = state.clone();
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        clone.update_from_headers(&headers);
        assert_eq!(state.remaining(), Some(0));
    }
}
