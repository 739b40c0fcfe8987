//! Server-reported quota tracking.
//!
//! The endpoint reports its view of our budget on every response:
//! - `x-ratelimit-limit-requests`: RPM limit
//! - `x-ratelimit-limit-tokens`: TPM limit
//! - `x-ratelimit-remaining-requests`: RPM remaining
//! - `x-ratelimit-remaining-tokens`: TPM remaining
//! - `x-ratelimit-reset-requests`: RPM reset time (duration string)
//! - `x-ratelimit-reset-tokens`: TPM reset time (duration string)
//!
//! [`QuotaTracker`] keeps the latest complete set. A partial or garbled set
//! is ignored as a whole, so the tracked state never mixes two responses and
//! never becomes more permissive because of bad metadata.

use crate::parse_duration;
use augur_error::{RateLimitError, RateLimitErrorKind};
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

const LIMIT_REQUESTS: &str = "x-ratelimit-limit-requests";
const LIMIT_TOKENS: &str = "x-ratelimit-limit-tokens";
const REMAINING_REQUESTS: &str = "x-ratelimit-remaining-requests";
const REMAINING_TOKENS: &str = "x-ratelimit-remaining-tokens";
const RESET_REQUESTS: &str = "x-ratelimit-reset-requests";
const RESET_TOKENS: &str = "x-ratelimit-reset-tokens";

const ALL_HEADERS: [&str; 6] = [
    LIMIT_REQUESTS,
    LIMIT_TOKENS,
    REMAINING_REQUESTS,
    REMAINING_TOKENS,
    RESET_REQUESTS,
    RESET_TOKENS,
];

/// One complete, parsed set of rate limit headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaHeaders {
    /// Requests allowed per window
    pub limit_requests: u64,
    /// Tokens allowed per window
    pub limit_tokens: u64,
    /// Requests left in the current window
    pub remaining_requests: i64,
    /// Tokens left in the current window
    pub remaining_tokens: i64,
    /// Time until the request window resets
    pub reset_requests: Duration,
    /// Time until the token window resets
    pub reset_tokens: Duration,
}

/// Parse all six rate limit headers.
///
/// # Errors
///
/// Fails if any header is missing, is not valid text, or does not parse.
pub fn parse_quota_headers(headers: &HeaderMap) -> Result<QuotaHeaders, RateLimitError> {
    Ok(QuotaHeaders {
        limit_requests: header_number(headers, LIMIT_REQUESTS)?,
        limit_tokens: header_number(headers, LIMIT_TOKENS)?,
        remaining_requests: header_number(headers, REMAINING_REQUESTS)?,
        remaining_tokens: header_number(headers, REMAINING_TOKENS)?,
        reset_requests: parse_duration(header_str(headers, RESET_REQUESTS)?)?,
        reset_tokens: parse_duration(header_str(headers, RESET_TOKENS)?)?,
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, RateLimitError> {
    let value = headers
        .get(name)
        .ok_or_else(|| RateLimitError::new(RateLimitErrorKind::MissingHeader(name.to_string())))?;
    value.to_str().map_err(|_| {
        RateLimitError::new(RateLimitErrorKind::InvalidHeader {
            name: name.to_string(),
            value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
        })
    })
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Result<T, RateLimitError> {
    let raw = header_str(headers, name)?;
    raw.trim().parse().map_err(|_| {
        RateLimitError::new(RateLimitErrorKind::InvalidHeader {
            name: name.to_string(),
            value: raw.to_string(),
        })
    })
}

/// Latest quota reported by the endpoint.
///
/// Remaining counts are upper bounds: they are only ever used to decide
/// that a call must wait, never to shorten a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct QuotaState {
    /// Requests allowed per window
    limit_requests: u64,
    /// Tokens allowed per window
    limit_tokens: u64,
    /// Requests left in the current window
    remaining_requests: i64,
    /// Tokens left in the current window
    remaining_tokens: i64,
    /// When the request window resets
    reset_requests_at: Instant,
    /// When the token window resets
    reset_tokens_at: Instant,
}

impl QuotaState {
    /// State before any response has been seen: nothing known, nothing blocked.
    pub fn unknown(now: Instant) -> Self {
        Self {
            limit_requests: u64::MAX,
            limit_tokens: u64::MAX,
            remaining_requests: i64::MAX,
            remaining_tokens: i64::MAX,
            reset_requests_at: now,
            reset_tokens_at: now,
        }
    }

    /// `None` if a reset deadline lies beyond what an [`Instant`] can hold.
    fn from_headers(headers: QuotaHeaders, now: Instant) -> Option<Self> {
        Some(Self {
            limit_requests: headers.limit_requests,
            limit_tokens: headers.limit_tokens,
            remaining_requests: headers.remaining_requests,
            remaining_tokens: headers.remaining_tokens,
            reset_requests_at: now.checked_add(headers.reset_requests)?,
            reset_tokens_at: now.checked_add(headers.reset_tokens)?,
        })
    }
}

/// Tracks the quota the endpoint reports in its response headers.
///
/// # Example
///
/// ```rust,ignore
/// let mut tracker = QuotaTracker::new();
/// tracker.update(reply.headers());
/// if let Some(wait) = tracker.wait_for(estimated_tokens, Instant::now()) {
///     tokio::time::sleep(wait).await;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    state: QuotaState,
}

impl QuotaTracker {
    /// Create a tracker with no quota information yet.
    pub fn new() -> Self {
        Self {
            state: QuotaState::unknown(Instant::now()),
        }
    }

    /// Current quota state.
    pub fn state(&self) -> &QuotaState {
        &self.state
    }

    /// Refresh from response headers.
    ///
    /// Returns true if the state was replaced. Absent headers leave the state
    /// alone silently; a partial or malformed set is logged as a warning and
    /// also leaves it alone.
    pub fn update(&mut self, headers: &HeaderMap) -> bool {
        if !ALL_HEADERS.iter().any(|name| headers.contains_key(*name)) {
            debug!("Response carried no rate limit headers");
            return false;
        }

        let parsed = match parse_quota_headers(headers) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed rate limit headers, keeping previous quota");
                return false;
            }
        };

        match QuotaState::from_headers(parsed, Instant::now()) {
            Some(state) => {
                self.state = state;
                debug!(
                    remaining_requests = parsed.remaining_requests,
                    remaining_tokens = parsed.remaining_tokens,
                    reset_requests_ms = parsed.reset_requests.as_millis() as u64,
                    reset_tokens_ms = parsed.reset_tokens.as_millis() as u64,
                    "Updated quota from response headers"
                );
                true
            }
            None => {
                warn!(
                    reset_requests_secs = parsed.reset_requests.as_secs(),
                    reset_tokens_secs = parsed.reset_tokens.as_secs(),
                    "Ignoring out of range rate limit reset, keeping previous quota"
                );
                false
            }
        }
    }

    /// True if a call costing `tokens_needed` must wait for a reset.
    pub fn should_wait(&self, tokens_needed: u64) -> bool {
        let tokens_needed = i64::try_from(tokens_needed).unwrap_or(i64::MAX);
        self.state.remaining_tokens < tokens_needed || self.state.remaining_requests <= 0
    }

    /// The later of the two reset deadlines.
    pub fn resume_at(&self) -> Instant {
        self.state.reset_requests_at.max(self.state.reset_tokens_at)
    }

    /// How long a call costing `tokens_needed` must wait, if at all.
    ///
    /// Never negative: a reset deadline already in the past yields zero.
    pub fn wait_for(&self, tokens_needed: u64, now: Instant) -> Option<Duration> {
        self.should_wait(tokens_needed)
            .then(|| self.resume_at().saturating_duration_since(now))
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in entries {
            map.insert(
                HeaderName::from_bytes(key.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    fn full(remaining_requests: &str, remaining_tokens: &str) -> HeaderMap {
        headers(&[
            (LIMIT_REQUESTS, "500"),
            (LIMIT_TOKENS, "30000"),
            (REMAINING_REQUESTS, remaining_requests),
            (REMAINING_TOKENS, remaining_tokens),
            (RESET_REQUESTS, "120ms"),
            (RESET_TOKENS, "6m0s"),
        ])
    }

    #[test]
    fn test_fresh_tracker_never_waits() {
        let tracker = QuotaTracker::new();
        assert!(!tracker.should_wait(100_000));
        assert_eq!(tracker.wait_for(100_000, Instant::now()), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_applies_complete_headers() {
        let mut tracker = QuotaTracker::new();
        let before = Instant::now();
        assert!(tracker.update(&full("499", "29000")));

        let state = tracker.state();
        assert_eq!(*state.limit_requests(), 500);
        assert_eq!(*state.limit_tokens(), 30_000);
        assert_eq!(*state.remaining_requests(), 499);
        assert_eq!(*state.remaining_tokens(), 29_000);
        assert_eq!(*state.reset_requests_at(), before + Duration::from_millis(120));
        assert_eq!(tracker.resume_at(), before + Duration::from_secs(360));
    }

    #[test]
    fn test_should_wait_thresholds() {
        let mut tracker = QuotaTracker::new();
        tracker.update(&full("10", "500"));
        assert!(!tracker.should_wait(500));
        assert!(!tracker.should_wait(1));
        assert!(tracker.should_wait(501));

        tracker.update(&full("0", "100000"));
        assert!(tracker.should_wait(0));
        assert!(tracker.should_wait(1));

        tracker.update(&full("-3", "100000"));
        assert!(tracker.should_wait(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_uses_later_reset_and_never_negative() {
        let mut tracker = QuotaTracker::new();
        tracker.update(&full("0", "0"));
        let now = Instant::now();
        assert_eq!(tracker.wait_for(10, now), Some(Duration::from_secs(360)));

        tokio::time::advance(Duration::from_secs(400)).await;
        assert_eq!(tracker.wait_for(10, Instant::now()), Some(Duration::ZERO));
    }

    #[test]
    fn test_partial_headers_retain_previous_state() {
        let mut tracker = QuotaTracker::new();
        tracker.update(&full("42", "4200"));
        let before = *tracker.state();

        let partial = headers(&[(REMAINING_REQUESTS, "0"), (REMAINING_TOKENS, "0")]);
        assert!(!tracker.update(&partial));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_garbled_reset_retains_previous_state() {
        let mut tracker = QuotaTracker::new();
        tracker.update(&full("42", "4200"));
        let before = *tracker.state();

        let mut garbled = full("0", "0");
        garbled.insert(RESET_TOKENS, HeaderValue::from_static("soon"));
        assert!(!tracker.update(&garbled));
        assert_eq!(*tracker.state(), before);

        let mut empty_reset = full("0", "0");
        empty_reset.insert(RESET_REQUESTS, HeaderValue::from_static(""));
        assert!(!tracker.update(&empty_reset));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_out_of_range_reset_retains_previous_state() {
        let mut tracker = QuotaTracker::new();
        tracker.update(&full("42", "4200"));
        let before = *tracker.state();

        let mut distant = full("0", "0");
        distant.insert(RESET_REQUESTS, HeaderValue::from_static("4000000000000000h"));
        assert!(!tracker.update(&distant));
        assert_eq!(*tracker.state(), before);
    }

    #[test]
    fn test_absent_headers_are_not_an_error() {
        let mut tracker = QuotaTracker::new();
        assert!(!tracker.update(&HeaderMap::new()));
        assert!(!tracker.should_wait(1));
    }

    #[test]
    fn test_parse_quota_headers_reports_missing_header() {
        let err = parse_quota_headers(&headers(&[(LIMIT_REQUESTS, "500")])).unwrap_err();
        assert!(matches!(err.kind(), RateLimitErrorKind::MissingHeader(name) if name == LIMIT_TOKENS));
    }
}
