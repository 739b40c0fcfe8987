//! HTTP client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use augur_core::CompletionRequest;
use augur_error::{ModelsError, ModelsErrorKind, ModelsResult};
use augur_interface::{CompletionDriver, CompletionReply};
use augur_rate_limit::EndpointConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Chat completions client.
///
/// Returns every HTTP response as a [`CompletionReply`]; only failures to
/// obtain a response at all are errors.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Creates a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`ModelsErrorKind::ClientCreation`] if the HTTP client cannot
    /// be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        url: impl Into<String>,
        timeout: Duration,
    ) -> ModelsResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::ClientCreation(e.to_string())))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            url: url.into(),
        })
    }

    /// Creates a client from the endpoint configuration.
    ///
    /// Reads the API key from the environment variable named by
    /// `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelsErrorKind::MissingApiKey`] if the variable is unset or
    /// empty.
    #[instrument(skip_all, fields(model = %config.model, url = %config.url))]
    pub fn from_config(config: &EndpointConfig) -> ModelsResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ModelsError::new(ModelsErrorKind::MissingApiKey(config.api_key_env.clone()))
            })?;

        debug!("Creating completion client");
        Self::new(
            api_key,
            config.model.clone(),
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionDriver for OpenAiClient {
    #[instrument(skip(self, req), fields(provider = "openai", model = %self.model))]
    async fn complete(&self, req: &CompletionRequest) -> ModelsResult<CompletionReply> {
        debug!(messages = req.messages().len(), "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                if e.is_timeout() {
                    ModelsError::new(ModelsErrorKind::Timeout(e.to_string()))
                } else {
                    ModelsError::new(ModelsErrorKind::Transport(e.to_string()))
                }
            })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(|e| {
            warn!(status, error = %e, "Failed to read completion body");
            ModelsError::new(ModelsErrorKind::Transport(format!(
                "Failed to read body: {}",
                e
            )))
        })?;

        debug!(status, body_len = body.len(), "Received completion reply");
        Ok(CompletionReply::new(status, headers, body))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
