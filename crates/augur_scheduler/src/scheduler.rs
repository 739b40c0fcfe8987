//! The per-record scoring loop.

use crate::{
    RateLimitChoice, RateLimitDecider, RecordOutcome, ResponseValidator, RunReport, StopReason,
    decider_for,
};
use augur_core::{CompletionRequest, Record, build_prompt};
use augur_error::{AugurResult, RetryableError};
use augur_interface::{CompletionDriver, RecordStore};
use augur_models::{CostAccountant, CostLedger, ReplyClass, classify_reply};
use augur_rate_limit::{
    AbandonReason, AttemptOutcome, AugurConfig, RetryCounters, RetryDecision, RetryPolicy,
    SlotGate,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Scores records one at a time against a completion endpoint.
///
/// Each record moves through
/// `NEW → WAITING_SLOT → IN_FLIGHT → DONE | ABANDONED`, looping back to
/// `WAITING_SLOT` while its retry budgets last. Every wait goes through
/// [`SlotGate::await_slot`], so each attempt has exactly one suspension
/// point before it.
///
/// # Example
///
/// ```no_run
/// use augur_database::SqliteRecordStore;
/// use augur_models::OpenAiClient;
/// use augur_rate_limit::AugurConfig;
/// use augur_scheduler::RequestScheduler;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AugurConfig::load()?;
/// let driver = Arc::new(OpenAiClient::from_config(&config.endpoint)?);
/// let store = Arc::new(SqliteRecordStore::open(&config.database.url)?);
/// let mut scheduler = RequestScheduler::new(driver, store, &config)?;
/// let report = scheduler.run(false, None).await?;
/// println!("{report}");
/// # Ok(())
/// # }
/// ```
pub struct RequestScheduler {
    driver: Arc<dyn CompletionDriver>,
    store: Arc<dyn RecordStore>,
    decider: Arc<dyn RateLimitDecider>,
    gate: SlotGate,
    policy: RetryPolicy,
    validator: ResponseValidator,
    accountant: CostAccountant,
    stock_index: String,
    answer_tokens: u64,
    cancel: CancellationToken,
}

impl RequestScheduler {
    /// Create a scheduler from configuration.
    ///
    /// # Errors
    ///
    /// Fails if the configured prices do not parse or no tokenizer loads.
    pub fn new(
        driver: Arc<dyn CompletionDriver>,
        store: Arc<dyn RecordStore>,
        config: &AugurConfig,
    ) -> AugurResult<Self> {
        let accountant = CostAccountant::from_config(&config.pricing, driver.model_name())?;
        Ok(Self {
            driver,
            store,
            decider: decider_for(config.retry.on_unexplained_rate_limit),
            gate: SlotGate::from_config(&config.pacing),
            policy: RetryPolicy::from_config(&config.retry),
            validator: ResponseValidator,
            accountant,
            stock_index: config.prompt.stock_index.clone(),
            answer_tokens: config.quota.answer_tokens,
            cancel: CancellationToken::new(),
        })
    }

    /// Replace the decider for unexplained rate limits.
    pub fn with_decider(mut self, decider: Arc<dyn RateLimitDecider>) -> Self {
        self.decider = decider;
        self
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Share a slot gate with other schedulers.
    pub fn with_gate(mut self, gate: SlotGate) -> Self {
        self.gate = gate;
        self
    }

    /// Use an external cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run at the next record boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cost so far.
    pub fn ledger(&self) -> &CostLedger {
        self.accountant.ledger()
    }

    /// Score every pending record, or the first `limit` of them.
    ///
    /// Per-record failures are logged and counted; only store failures and
    /// failed operator prompts end the run with an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written, or the
    /// decider fails.
    #[instrument(skip(self))]
    pub async fn run(&mut self, include_scored: bool, limit: Option<usize>) -> AugurResult<RunReport> {
        let mut records = self.store.records(include_scored).await?;
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        let total = records.len();
        info!(total, "Starting scoring run");

        let mut report = RunReport::default();
        for (index, record) in records.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(remaining = total - index, "Run cancelled");
                report.stop(StopReason::Cancelled, total - index);
                break;
            }

            let outcome = self.score_record(record).await?;
            report.count(&outcome);
            if let RecordOutcome::Aborted { .. } = outcome {
                warn!(record_id = *record.id(), "Run aborted by operator");
                report.stop(StopReason::Aborted(*record.id()), total - index - 1);
                break;
            }
        }

        report.set_ledger(*self.accountant.ledger());
        info!(
            done = *report.done(),
            abandoned = *report.abandoned(),
            skipped = *report.skipped(),
            cost = %report.ledger().total_cost(),
            "Scoring run finished"
        );
        Ok(report)
    }

    /// Drive one record to completion or abandonment.
    ///
    /// # Errors
    ///
    /// Returns an error if the score cannot be persisted or the decider fails.
    #[instrument(skip(self, record), fields(record_id = *record.id()))]
    pub async fn score_record(&mut self, record: &Record) -> AugurResult<RecordOutcome> {
        let messages = build_prompt(
            *record.year(),
            *record.month(),
            record.headline(),
            &self.stock_index,
        );
        let request = CompletionRequest::new(self.driver.model_name(), messages);
        let tokens_needed = self.accountant.request_tokens(&request) + self.answer_tokens;

        let mut counters = RetryCounters::default();
        let mut delay: Option<Duration> = None;
        let mut last_error = String::new();
        let mut attempt: usize = 0;

        loop {
            attempt += 1;
            let grant = self.gate.await_slot(tokens_needed, delay.take()).await;
            debug!(
                attempt,
                waited_ms = grant.waited().as_millis() as u64,
                quota_blocked = *grant.quota_blocked(),
                "Dispatching"
            );

            let outcome = self.attempt(&request).await;
            match &outcome {
                AttemptOutcome::Valid(_) => {}
                AttemptOutcome::InvalidOutput(reason) => last_error = format!("invalid output: {}", reason),
                AttemptOutcome::Transient(reason) | AttemptOutcome::Rejected(reason) => {
                    last_error = reason.clone()
                }
                AttemptOutcome::RateLimited { message, .. } => last_error = message.clone(),
            }

            match self.policy.decide(&outcome, &mut counters) {
                RetryDecision::Proceed(score) => {
                    self.store.update_score(*record.id(), score).await?;
                    info!(
                        score = score.value(),
                        attempts = attempt,
                        invalid = *counters.invalid_output_count(),
                        transient = *counters.transient_error_count(),
                        cost = %self.accountant.ledger().total_cost(),
                        "Record scored"
                    );
                    return Ok(RecordOutcome::Done { score, counters });
                }
                RetryDecision::RetryNow => {
                    warn!(
                        attempt,
                        invalid = *counters.invalid_output_count(),
                        error = %last_error,
                        "Invalid answer, retrying"
                    );
                }
                RetryDecision::Backoff(wait) => {
                    warn!(
                        attempt,
                        transient = *counters.transient_error_count(),
                        wait_ms = wait.as_millis() as u64,
                        error = %last_error,
                        "Transient failure, backing off"
                    );
                    delay = Some(wait);
                }
                RetryDecision::WaitHint(wait) => {
                    info!(
                        attempt,
                        waits = *counters.rate_limit_wait_count(),
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited, waiting as instructed"
                    );
                    delay = Some(wait);
                }
                RetryDecision::Escalate(message) => {
                    match self.decider.decide(record, &message).await? {
                        RateLimitChoice::Backoff => match self.policy.charge_transient(&mut counters) {
                            Some(wait) => {
                                warn!(
                                    attempt,
                                    transient = *counters.transient_error_count(),
                                    wait_ms = wait.as_millis() as u64,
                                    error = %message,
                                    "Rate limited without a hint, backing off"
                                );
                                delay = Some(wait);
                            }
                            None => {
                                return Ok(self.abandon(AbandonReason::TransientLimit, counters, last_error));
                            }
                        },
                        RateLimitChoice::Abandon => {
                            return Ok(self.abandon(AbandonReason::Operator, counters, last_error));
                        }
                        RateLimitChoice::Abort => return Ok(RecordOutcome::Aborted { counters }),
                    }
                }
                RetryDecision::Abandon(reason) => {
                    return Ok(self.abandon(reason, counters, last_error));
                }
            }
        }
    }

    /// One call: dispatch, feed headers to the quota tracker, charge the cost
    /// of any answer, and classify.
    async fn attempt(&mut self, request: &CompletionRequest) -> AttemptOutcome {
        match self.driver.complete(request).await {
            Ok(reply) => {
                self.gate.record_response(reply.headers()).await;
                let class = classify_reply(&reply);
                if let ReplyClass::Completion(text) = &class {
                    self.accountant.record(request, text);
                }
                self.validator.interpret(&class)
            }
            Err(e) if e.is_retryable() => AttemptOutcome::Transient(e.to_string()),
            Err(e) => AttemptOutcome::Rejected(e.to_string()),
        }
    }

    fn abandon(
        &self,
        reason: AbandonReason,
        counters: RetryCounters,
        last_error: String,
    ) -> RecordOutcome {
        error!(
            %reason,
            invalid = *counters.invalid_output_count(),
            transient = *counters.transient_error_count(),
            rate_limit_waits = *counters.rate_limit_wait_count(),
            last_error = %last_error,
            "Abandoning record"
        );
        RecordOutcome::Abandoned {
            reason,
            counters,
            last_error,
        }
    }
}

impl std::fmt::Debug for RequestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestScheduler")
            .field("provider", &self.driver.provider_name())
            .field("model", &self.driver.model_name())
            .field("policy", &self.policy)
            .field("ledger", self.accountant.ledger())
            .finish_non_exhaustive()
    }
}
