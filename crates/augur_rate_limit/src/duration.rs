//! Compound duration strings such as `"1h2m3.4s"`.
//!
//! The endpoint reports reset timers (`x-ratelimit-reset-*`) and retry hints
//! ("Please try again in 20s") in this format. Each of the hour, minute,
//! second and millisecond segments is optional, but at least one must be
//! present.

use augur_error::{RateLimitError, RateLimitErrorKind};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tokio::time::Instant;

/// Longest single wait the pipeline will honor.
///
/// Reset timers, retry hints and backoffs beyond this are clamped to it.
pub const MAX_WAIT: Duration = Duration::from_secs(7 * 24 * 60 * 60);

static DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)h)?(?:(\d+)m)?(?:(\d+(?:\.\d+)?)s)?(?:(\d+)ms)?$")
        .expect("Valid duration regex")
});

static RETRY_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)try again in\s+([0-9][0-9hms.]*)").expect("Valid retry hint regex")
});

/// Parse a compound duration string.
///
/// # Errors
///
/// Returns [`RateLimitErrorKind::DurationParse`] when the string is not of
/// the form `[<h>h][<m>m][<s>s][<ms>ms]` or matches no segment at all.
///
/// # Examples
///
/// ```
/// use augur_rate_limit::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
/// assert_eq!(parse_duration("6m0s").unwrap(), Duration::from_secs(360));
/// assert_eq!(parse_duration("20ms").unwrap(), Duration::from_millis(20));
/// assert!(parse_duration("").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, RateLimitError> {
    let trimmed = input.trim();
    let fail = || RateLimitError::new(RateLimitErrorKind::DurationParse(input.to_string()));

    let caps = DURATION.captures(trimmed).ok_or_else(fail)?;
    if (1..=4).all(|i| caps.get(i).is_none()) {
        return Err(fail());
    }

    let whole = |i: usize| -> Result<u64, RateLimitError> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| fail()))
            .transpose()
            .map(|v| v.unwrap_or(0))
    };

    let (secs, nanos) = match caps.get(3) {
        Some(m) => split_seconds(m.as_str()).ok_or_else(fail)?,
        None => (0, 0),
    };

    let (hours, minutes, millis) = (whole(1)?, whole(2)?, whole(4)?);
    let total_secs = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes.checked_mul(60)?))
        .and_then(|hm| hm.checked_add(secs))
        .ok_or_else(fail)?;

    Duration::from_secs(total_secs)
        .checked_add(Duration::from_nanos(nanos))
        .and_then(|d| d.checked_add(Duration::from_millis(millis)))
        .ok_or_else(fail)
}

/// Split `"3.4"` into whole seconds and nanoseconds without going through f64.
fn split_seconds(raw: &str) -> Option<(u64, u64)> {
    let (whole, frac) = raw.split_once('.').unwrap_or((raw, ""));
    let secs = whole.parse().ok()?;
    let digits: String = frac.chars().chain(std::iter::repeat('0')).take(9).collect();
    Some((secs, digits.parse().ok()?))
}

/// Extract the wait the endpoint asked for from a rate limit error message.
///
/// Returns `None` when the message carries no hint or the hint does not
/// parse, in which case the caller has to decide how long to wait itself.
///
/// # Examples
///
/// ```
/// use augur_rate_limit::retry_hint;
/// use std::time::Duration;
///
/// let msg = "Rate limit reached for requests. Please try again in 20s. Visit ...";
/// assert_eq!(retry_hint(msg), Some(Duration::from_secs(20)));
/// assert_eq!(retry_hint("Rate limit reached."), None);
/// ```
pub fn retry_hint(message: &str) -> Option<Duration> {
    let caps = RETRY_HINT.captures(message)?;
    let raw = caps.get(1)?.as_str().trim_end_matches('.');
    parse_duration(raw).ok()
}

/// `from + wait`, with `wait` clamped to [`MAX_WAIT`].
///
/// Never panics, however large the wait the endpoint reported.
pub fn deadline_after(from: Instant, wait: Duration) -> Instant {
    from.checked_add(wait.min(MAX_WAIT)).unwrap_or(from)
}
