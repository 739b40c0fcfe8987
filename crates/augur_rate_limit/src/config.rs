//! Configuration structures for the scoring pipeline.
//!
//! Configuration is TOML, layered with the `config` crate:
//! - Bundled defaults (include_str! from augur.toml)
//! - User overrides (~/.config/augur/augur.toml, then ./augur.toml)
//! - `AUGUR_<SECTION>__<KEY>` environment variables
//!
//! Later sources take precedence.

use crate::MAX_WAIT;
use augur_error::{AugurResult, ConfigError};
use config::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

/// Completion endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Full URL of the chat completions endpoint
    pub url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Fixed request cadence.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PacingConfig {
    /// Target requests per minute, independent of the server quota
    pub requests_per_minute: f64,
}

impl PacingConfig {
    /// Spacing between consecutive call start times, at most [`MAX_WAIT`].
    pub fn interval(&self) -> Duration {
        self.checked_interval().unwrap_or(MAX_WAIT).min(MAX_WAIT)
    }

    fn checked_interval(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(60.0 / self.requests_per_minute).ok()
    }
}

/// What to do when the endpoint rate limits without saying for how long.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnexplainedRateLimit {
    /// Treat it as a transient failure and back off
    #[default]
    Backoff,
    /// Give up on the current record and continue with the next
    Abandon,
    /// Stop the whole run
    Abort,
}

/// Retry bounds and backoff shape.
///
/// The transient and invalid-output budgets are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries allowed for network failures, malformed envelopes and
    /// unexplained rate limits
    pub max_transient_retries: usize,

    /// Retries allowed for answers that are not an integer in 1..=100
    pub max_invalid_retries: usize,

    /// Hinted rate limit waits allowed per record
    pub max_rate_limit_waits: usize,

    /// First backoff delay in milliseconds (doubles per retry)
    pub initial_backoff_ms: u64,

    /// Cap on any single backoff delay
    pub max_backoff_secs: u64,

    /// Policy for rate limit rejections without a retry hint
    #[serde(default)]
    pub on_unexplained_rate_limit: UnexplainedRateLimit,
}

/// Unit prices, as decimal strings so no precision is lost in parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PricingConfig {
    /// USD per input token
    pub input_token_usd: String,

    /// USD per output token
    pub output_token_usd: String,
}

impl PricingConfig {
    /// Parsed input token price.
    ///
    /// # Errors
    ///
    /// Fails if the price is not a non-negative decimal.
    pub fn input_price(&self) -> Result<Decimal, ConfigError> {
        parse_price("pricing.input_token_usd", &self.input_token_usd)
    }

    /// Parsed output token price.
    ///
    /// # Errors
    ///
    /// Fails if the price is not a non-negative decimal.
    pub fn output_price(&self) -> Result<Decimal, ConfigError> {
        parse_price("pricing.output_token_usd", &self.output_token_usd)
    }
}

fn parse_price(field: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let price = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::new(format!("{} is not a decimal ('{}'): {}", field, raw, e)))?;
    if price.is_sign_negative() {
        return Err(ConfigError::new(format!("{} must not be negative, got {}", field, raw)));
    }
    Ok(price)
}

/// Prompt settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PromptConfig {
    /// Market index the model is asked about
    pub stock_index: String,
}

/// Quota gating settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuotaConfig {
    /// Tokens reserved for the answer on top of the counted prompt when
    /// checking the token quota
    pub answer_tokens: u64,
}

/// Record store location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub url: String,
}

/// Top-level augur configuration.
///
/// # Example
///
/// ```no_run
/// use augur_rate_limit::AugurConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AugurConfig::load()?;
/// println!("pacing interval: {:?}", config.pacing.interval());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AugurConfig {
    /// Completion endpoint
    pub endpoint: EndpointConfig,
    /// Request cadence
    pub pacing: PacingConfig,
    /// Retry bounds
    pub retry: RetryConfig,
    /// Token prices
    pub pricing: PricingConfig,
    /// Prompt settings
    pub prompt: PromptConfig,
    /// Quota gating
    pub quota: QuotaConfig,
    /// Record store
    pub database: DatabaseConfig,
}

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../augur.toml");

impl AugurConfig {
    /// The bundled defaults alone, with no user overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse or validate.
    pub fn bundled() -> AugurResult<Self> {
        let builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));
        Self::finish(builder)
    }

    /// Load configuration from a specific file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> AugurResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse or the merged
    /// result fails validation.
    #[instrument]
    pub fn load() -> AugurResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/augur/augur.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("augur").required(false))
            .add_source(
                Environment::with_prefix("AUGUR")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::finish(builder)
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> AugurResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rpm = self.pacing.requests_per_minute;
        if !rpm.is_finite() || rpm <= 0.0 {
            return Err(ConfigError::new(format!(
                "pacing.requests_per_minute must be positive, got {}",
                rpm
            )));
        }
        match self.pacing.checked_interval() {
            Some(interval) if interval <= MAX_WAIT => {}
            _ => {
                return Err(ConfigError::new(format!(
                    "pacing.requests_per_minute is too small, got {}",
                    rpm
                )));
            }
        }
        if self.retry.initial_backoff_ms == 0 {
            return Err(ConfigError::new("retry.initial_backoff_ms must be positive"));
        }
        if self.retry.max_backoff_secs == 0 {
            return Err(ConfigError::new("retry.max_backoff_secs must be positive"));
        }
        if Duration::from_secs(self.retry.max_backoff_secs) > MAX_WAIT {
            return Err(ConfigError::new(format!(
                "retry.max_backoff_secs must be at most {}, got {}",
                MAX_WAIT.as_secs(),
                self.retry.max_backoff_secs
            )));
        }
        self.pricing.input_price()?;
        self.pricing.output_price()?;
        if self.endpoint.model.trim().is_empty() {
            return Err(ConfigError::new("endpoint.model must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults() {
        let config = AugurConfig::bundled().unwrap();
        assert_eq!(config.endpoint.model, "gpt-4-0125-preview");
        assert_eq!(config.endpoint.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.pricing.input_token_usd, "0.00001");
        assert_eq!(config.retry.on_unexplained_rate_limit, UnexplainedRateLimit::Backoff);
        assert_eq!(config.prompt.stock_index, "CBOE Volatility Index");
    }

    #[test]
    fn test_pacing_interval() {
        let pacing = PacingConfig {
            requests_per_minute: 120.0,
        };
        assert_eq!(pacing.interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_validate_rejects_zero_rate() {
        let mut config = AugurConfig::bundled().unwrap();
        config.pacing.requests_per_minute = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_rate() {
        let mut config = AugurConfig::bundled().unwrap();
        for rpm in [1e-20, f64::MIN_POSITIVE, 1e-5] {
            config.pacing.requests_per_minute = rpm;
            assert!(config.validate().is_err(), "{rpm} should be rejected");
            assert_eq!(config.pacing.interval(), MAX_WAIT);
        }

        config.pacing.requests_per_minute = 0.5;
        assert!(config.validate().is_ok());
        assert_eq!(config.pacing.interval(), Duration::from_secs(120));
    }

    #[test]
    fn test_validate_rejects_unbounded_backoff() {
        let mut config = AugurConfig::bundled().unwrap();
        config.retry.max_backoff_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_prices() {
        let cases = [("free", "0.00003"), ("0.00001", "-0.5"), ("", "0.00003"), ("0.00001", "1e")];
        for (input, output) in cases {
            let mut config = AugurConfig::bundled().unwrap();
            config.pricing.input_token_usd = input.into();
            config.pricing.output_token_usd = output.into();
            assert!(config.validate().is_err(), "({input:?}, {output:?}) should be rejected");
        }
    }

    #[test]
    fn test_prices_parse_as_decimals() {
        let config = AugurConfig::bundled().unwrap();
        assert_eq!(config.pricing.input_price().unwrap(), Decimal::new(1, 5));
        assert_eq!(config.pricing.output_price().unwrap(), Decimal::new(3, 5));
    }
}
