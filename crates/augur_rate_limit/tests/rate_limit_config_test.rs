//! Tests for the layered configuration.

use augur_rate_limit::{AugurConfig, PacingGate, RetryPolicy, UnexplainedRateLimit};
use std::io::Write;
use std::time::Duration;

fn write_toml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_bundled_retry_bounds() {
    let config = AugurConfig::bundled().unwrap();
    assert_eq!(config.retry.max_transient_retries, 8);
    assert_eq!(config.retry.max_invalid_retries, 25);
    assert_eq!(config.retry.max_rate_limit_waits, 50);
    assert_eq!(config.quota.answer_tokens, 16);
    assert_eq!(config.database.url, "headlines.db");
}

#[test]
fn test_file_overrides_bundled_values() {
    let file = write_toml(
        r#"
[pacing]
requests_per_minute = 60.0

[retry]
max_transient_retries = 2
max_invalid_retries = 4
max_rate_limit_waits = 6
initial_backoff_ms = 500
max_backoff_secs = 10
on_unexplained_rate_limit = "abort"
"#,
    );

    let config = AugurConfig::from_file(file.path()).unwrap();
    assert_eq!(config.pacing.interval(), Duration::from_secs(1));
    assert_eq!(config.retry.max_transient_retries, 2);
    assert_eq!(config.retry.on_unexplained_rate_limit, UnexplainedRateLimit::Abort);
    // Untouched sections keep their defaults
    assert_eq!(config.endpoint.model, "gpt-4-0125-preview");

    let gate = PacingGate::from_config(&config.pacing);
    assert_eq!(gate.interval(), Duration::from_secs(1));

    let policy = RetryPolicy::from_config(&config.retry).with_jitter(false);
    assert_eq!(policy.nominal_delay(1), Duration::from_millis(500));
    assert_eq!(policy.nominal_delay(2), Duration::from_secs(1));
}

#[test]
fn test_file_with_invalid_rate_is_rejected() {
    let file = write_toml("[pacing]\nrequests_per_minute = -5.0\n");
    let err = AugurConfig::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("requests_per_minute"));
}

#[test]
fn test_unknown_decision_policy_is_rejected() {
    let file = write_toml("[retry]\non_unexplained_rate_limit = \"shrug\"\n");
    assert!(AugurConfig::from_file(file.path()).is_err());
}

#[test]
fn test_unexplained_rate_limit_parses_from_str() {
    assert_eq!(
        "abandon".parse::<UnexplainedRateLimit>().unwrap(),
        UnexplainedRateLimit::Abandon
    );
    assert_eq!(UnexplainedRateLimit::Backoff.to_string(), "backoff");
}
