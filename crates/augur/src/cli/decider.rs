//! Operator prompt for rate limits without a retry hint.

use async_trait::async_trait;
use augur_core::Record;
use augur_error::{AugurResult, SchedulerError, SchedulerErrorKind};
use augur_scheduler::{RateLimitChoice, RateLimitDecider};
use std::io::{BufRead, Write};

/// Asks on the terminal whether to back off, skip the record or stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinDecider;

#[async_trait]
impl RateLimitDecider for StdinDecider {
    async fn decide(&self, record: &Record, message: &str) -> AugurResult<RateLimitChoice> {
        let prompt = format!(
            "Record {} was rate limited without a retry hint: {}\n\
             [b]ack off and retry, [s]kip this record, [q]uit the run? ",
            record.id(),
            message
        );
        let choice = tokio::task::spawn_blocking(move || ask(&prompt))
            .await
            .map_err(|e| SchedulerError::new(SchedulerErrorKind::Decision(e.to_string())))??;
        Ok(choice)
    }
}

/// Prompt until the answer parses. End of input stops the run.
fn ask(prompt: &str) -> Result<RateLimitChoice, SchedulerError> {
    let stdin = std::io::stdin();
    let mut stderr = std::io::stderr();
    let fail = |e: std::io::Error| SchedulerError::new(SchedulerErrorKind::Decision(e.to_string()));

    loop {
        write!(stderr, "{}", prompt).map_err(fail)?;
        stderr.flush().map_err(fail)?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).map_err(fail)? == 0 {
            return Ok(RateLimitChoice::Abort);
        }
        if let Some(choice) = parse_choice(&line) {
            return Ok(choice);
        }
    }
}

fn parse_choice(answer: &str) -> Option<RateLimitChoice> {
    match answer.trim().to_lowercase().as_str() {
        "b" | "back" | "backoff" | "retry" => Some(RateLimitChoice::Backoff),
        "s" | "skip" | "abandon" => Some(RateLimitChoice::Abandon),
        "q" | "quit" | "abort" | "stop" => Some(RateLimitChoice::Abort),
        _ => None,
    }
}
