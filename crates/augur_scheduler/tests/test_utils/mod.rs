//! Scripted collaborators for scheduler tests.

#![allow(dead_code)]

use async_trait::async_trait;
use augur_core::{CompletionRequest, Record, Score};
use augur_error::{AugurResult, ModelsError, ModelsErrorKind, ModelsResult};
use augur_interface::{CompletionDriver, CompletionReply, RecordStore};
use augur_rate_limit::AugurConfig;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

pub const MODEL: &str = "gpt-4-0125-preview";

/// Replays canned replies in order and records when each call arrived.
pub struct ScriptedDriver {
    script: Mutex<VecDeque<ModelsResult<CompletionReply>>>,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl ScriptedDriver {
    pub fn new(script: Vec<ModelsResult<CompletionReply>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Call times relative to the first call.
    pub fn call_offsets(&self) -> Vec<std::time::Duration> {
        let calls = self.calls.lock().unwrap();
        let Some((first, _)) = calls.first() else {
            return Vec::new();
        };
        calls.iter().map(|(at, _)| *at - *first).collect()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl CompletionDriver for ScriptedDriver {
    async fn complete(&self, req: &CompletionRequest) -> ModelsResult<CompletionReply> {
        let prompt = req
            .messages()
            .first()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.calls.lock().unwrap().push((Instant::now(), prompt));
        self.script.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(ModelsError::new(ModelsErrorKind::Transport(
                "script exhausted".to_string(),
            )))
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        MODEL
    }
}

/// Records held in memory; scores land in a map.
pub struct MemoryStore {
    records: Vec<Record>,
    scores: Mutex<HashMap<i32, Score>>,
}

impl MemoryStore {
    pub fn new(headlines: &[&str]) -> Self {
        let records = headlines
            .iter()
            .enumerate()
            .map(|(i, headline)| Record::new(i as i32 + 1, 2008, 9, *headline, None))
            .collect();
        Self {
            records,
            scores: Mutex::new(HashMap::new()),
        }
    }

    pub fn score(&self, id: i32) -> Option<i32> {
        self.scores.lock().unwrap().get(&id).map(|s| s.value())
    }

    pub fn scored_count(&self) -> usize {
        self.scores.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn records(&self, include_scored: bool) -> AugurResult<Vec<Record>> {
        let scores = self.scores.lock().unwrap();
        Ok(self
            .records
            .iter()
            .filter(|r| include_scored || !scores.contains_key(r.id()))
            .cloned()
            .collect())
    }

    async fn update_score(&self, id: i32, score: Score) -> AugurResult<()> {
        self.scores.lock().unwrap().insert(id, score);
        Ok(())
    }
}

pub fn completion(text: &str) -> ModelsResult<CompletionReply> {
    completion_with_headers(text, HeaderMap::new())
}

pub fn completion_with_headers(text: &str, headers: HeaderMap) -> ModelsResult<CompletionReply> {
    let body = completion_body(text);
    Ok(CompletionReply::new(200, headers, body))
}

fn completion_body(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
    format!(
        r#"{{"choices":[{{"index":0,"message":{{"role":"assistant","content":"{}"}}}}]}}"#,
        escaped
    )
}

pub fn http_error(status: u16, message: &str) -> ModelsResult<CompletionReply> {
    let body = format!(
        r#"{{"error":{{"message":"{}","type":"error","code":null}}}}"#,
        message
    );
    Ok(CompletionReply::new(status, HeaderMap::new(), body))
}

pub fn rate_limited(message: &str) -> ModelsResult<CompletionReply> {
    http_error(429, message)
}

pub fn transport_error() -> ModelsResult<CompletionReply> {
    Err(ModelsError::new(ModelsErrorKind::Transport(
        "connection reset by peer".to_string(),
    )))
}

/// A full set of rate limit headers.
pub fn quota_headers(remaining_requests: &str, remaining_tokens: &str, reset: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in [
        ("x-ratelimit-limit-requests", "500"),
        ("x-ratelimit-limit-tokens", "30000"),
        ("x-ratelimit-remaining-requests", remaining_requests),
        ("x-ratelimit-remaining-tokens", remaining_tokens),
        ("x-ratelimit-reset-requests", reset),
        ("x-ratelimit-reset-tokens", reset),
    ] {
        headers.insert(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    headers
}

/// Bundled configuration with a 100 ms pacing interval and small budgets.
pub fn test_config() -> AugurConfig {
    let mut config = AugurConfig::bundled().unwrap();
    config.pacing.requests_per_minute = 600.0;
    config.retry.max_transient_retries = 3;
    config.retry.max_invalid_retries = 2;
    config.retry.max_rate_limit_waits = 3;
    config.retry.initial_backoff_ms = 2000;
    config.retry.max_backoff_secs = 60;
    config
}
