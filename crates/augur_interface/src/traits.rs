//! Trait definitions for the endpoint and the record store.

use crate::CompletionReply;
use async_trait::async_trait;
use augur_core::{CompletionRequest, Record, Score};
use augur_error::{AugurResult, ModelsResult};

/// A chat completion backend.
///
/// Implementations return `Err` only when no HTTP response was received
/// (connection failure, timeout). Any response, including 4xx and 5xx, is
/// returned as a [`CompletionReply`].
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Send one completion request.
    async fn complete(&self, req: &CompletionRequest) -> ModelsResult<CompletionReply>;

    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Model identifier (e.g., "gpt-4-0125-preview").
    fn model_name(&self) -> &str;
}

/// Source of headline records and sink for their scores.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records in stable chronological order.
    ///
    /// When `include_scored` is false, records that already hold a score are
    /// skipped so an interrupted run resumes where it stopped.
    async fn records(&self, include_scored: bool) -> AugurResult<Vec<Record>>;

    /// Persist the score for record `id`. Writing the same score twice is harmless.
    async fn update_score(&self, id: i32, score: Score) -> AugurResult<()>;
}
