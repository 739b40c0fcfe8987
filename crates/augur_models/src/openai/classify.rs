//! Interpretation of raw endpoint replies.

use super::dto::{ApiError, ChatCompletion, ErrorEnvelope};
use augur_interface::CompletionReply;
use augur_rate_limit::retry_hint;
use std::time::Duration;
use tracing::debug;

/// Statuses that no amount of retrying will fix.
const PERMANENT_STATUSES: [u16; 4] = [400, 401, 403, 404];

/// Longest body excerpt quoted in a failure message.
const BODY_EXCERPT_CHARS: usize = 200;

/// What a reply means for the attempt that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyClass {
    /// The model's answer text, as sent
    Completion(String),
    /// Refused for rate reasons
    RateLimited {
        /// "try again in ..." wait, if the message carried a parsable one
        hint: Option<Duration>,
        /// Error message from the endpoint
        message: String,
    },
    /// Refused for good: bad request, authentication, unknown model
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the endpoint
        message: String,
    },
    /// Server error or an envelope without usable content
    Malformed(String),
}

/// Classify a reply from the chat completions endpoint.
///
/// # Examples
///
/// ```
/// use augur_interface::CompletionReply;
/// use augur_models::{ReplyClass, classify_reply};
/// use reqwest::header::HeaderMap;
///
/// let body = r#"{"choices":[{"message":{"role":"assistant","content":"45"}}]}"#;
/// let reply = CompletionReply::new(200, HeaderMap::new(), body);
/// assert_eq!(classify_reply(&reply), ReplyClass::Completion("45".into()));
/// ```
pub fn classify_reply(reply: &CompletionReply) -> ReplyClass {
    let status = *reply.status();
    let body = reply.body();
    let error = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    if reply.is_success() && error.is_none() {
        return completion_text(body);
    }

    let message = error
        .as_ref()
        .map(|e| e.message.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| excerpt(body, status));

    if status == 429 || error.as_ref().is_some_and(ApiError::mentions_rate_limit) {
        let hint = retry_hint(&message);
        debug!(status, hint_ms = hint.map(|h| h.as_millis() as u64), "Rate limited");
        return ReplyClass::RateLimited { hint, message };
    }

    if PERMANENT_STATUSES.contains(&status) {
        return ReplyClass::Rejected { status, message };
    }

    ReplyClass::Malformed(format!("HTTP {}: {}", status, message))
}

fn completion_text(body: &str) -> ReplyClass {
    match serde_json::from_str::<ChatCompletion>(body) {
        Ok(completion) => completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(ReplyClass::Completion)
            .unwrap_or_else(|| {
                ReplyClass::Malformed("Completion carried no message content".to_string())
            }),
        Err(e) => ReplyClass::Malformed(format!("Failed to parse completion: {}", e)),
    }
}

fn excerpt(body: &str, status: u16) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("empty body with status {}", status)
    } else {
        trimmed.chars().take(BODY_EXCERPT_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn reply(status: u16, body: &str) -> CompletionReply {
        CompletionReply::new(status, HeaderMap::new(), body)
    }

    #[test]
    fn test_completion_text_is_returned_verbatim() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":" 72\n"}}]}"#;
        assert_eq!(classify_reply(&reply(200, body)), ReplyClass::Completion(" 72\n".into()));
    }

    #[test]
    fn test_success_without_content_is_malformed() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#,
            "not json",
            "",
        ] {
            assert!(
                matches!(classify_reply(&reply(200, body)), ReplyClass::Malformed(_)),
                "{body:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_rate_limit_with_hint() {
        let body = r#"{"error":{"message":"Rate limit reached for gpt-4 on tokens per min. Please try again in 1h2m3.4s.","type":"tokens","code":"rate_limit_exceeded"}}"#;
        match classify_reply(&reply(429, body)) {
            ReplyClass::RateLimited { hint, message } => {
                let hint = hint.unwrap();
                assert!((hint.as_secs_f64() - 3723.4).abs() < 1e-6);
                assert!(message.starts_with("Rate limit reached"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_without_hint() {
        let body = r#"{"error":{"message":"You exceeded your current quota.","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        assert_eq!(
            classify_reply(&reply(429, body)),
            ReplyClass::RateLimited {
                hint: None,
                message: "You exceeded your current quota.".into()
            }
        );
    }

    #[test]
    fn test_rate_limit_detected_from_error_code() {
        let body = r#"{"error":{"message":"Slow down","type":"requests","code":"rate_limit_exceeded"}}"#;
        assert!(matches!(
            classify_reply(&reply(503, body)),
            ReplyClass::RateLimited { hint: None, .. }
        ));
    }

    #[test]
    fn test_permanent_statuses_are_rejected() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(
            classify_reply(&reply(401, body)),
            ReplyClass::Rejected {
                status: 401,
                message: "Incorrect API key provided".into()
            }
        );
        assert!(matches!(
            classify_reply(&reply(404, "")),
            ReplyClass::Rejected { status: 404, .. }
        ));
    }

    #[test]
    fn test_server_errors_are_malformed() {
        assert_eq!(
            classify_reply(&reply(502, "<html>Bad gateway</html>")),
            ReplyClass::Malformed("HTTP 502: <html>Bad gateway</html>".into())
        );
        assert_eq!(
            classify_reply(&reply(500, "")),
            ReplyClass::Malformed("HTTP 500: empty body with status 500".into())
        );
    }
}
