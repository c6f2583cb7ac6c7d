//! Runtime configuration for the distill agent.
//!
//! Settings resolve in layers: built-in defaults, then environment variables,
//! then CLI flags. There is no persisted configuration file; credentials and
//! knobs come from the environment (a `.env` file is loaded at startup).
//!
//! Recognized environment variables:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `OPENAI_API_KEY` | Bearer credential for the model endpoint |
//! | `OPENAI_BASE_URL` | Endpoint base URL |
//! | `DISTILL_MODEL` | Main conversation model id |
//! | `DISTILL_SUMMARIZER_MODEL` | Summarizer model id |
//! | `DISTILL_TEMPERATURE` | Main model sampling temperature, 0..=1 |
//! | `DISTILL_KEEP_COUNT` | Messages retained verbatim |
//! | `DISTILL_CHUNK_SIZE` | Messages per summary turn (chunked mode) |
//! | `DISTILL_GRANULARITY` | `single-shot` or `chunked` |
//! | `DISTILL_TIMEOUT_SECS` | Per-request timeout for remote calls |

use std::time::Duration;

use anyhow::{Context, Result};

use crate::compaction::{CompactionConfig, DEFAULT_CHUNK_SIZE, DEFAULT_KEEP_COUNT};
use crate::errors::ModelError;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
/// The summarizer runs cooler than the main conversation.
const DEFAULT_SUMMARIZER_TEMPERATURE: f32 = 0.5;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// CLI-level overrides, applied on top of environment values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub summarizer_model: Option<String>,
    pub temperature: Option<f32>,
    pub keep_count: Option<usize>,
    pub chunk_size: Option<usize>,
    pub granularity: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub summarizer_model: String,
    pub temperature: f32,
    pub summarizer_temperature: f32,
    pub timeout: Duration,
    pub compaction: CompactionConfig,
}

impl Settings {
    /// Resolve settings from the process environment plus CLI overrides.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        Self::resolve_from(&|key| std::env::var(key).ok(), overrides)
    }

    /// Resolve from an explicit environment lookup (testable seam).
    pub fn resolve_from(
        env: &dyn Fn(&str) -> Option<String>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let model = overrides
            .model
            .clone()
            .or_else(|| env("DISTILL_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let summarizer_model = overrides
            .summarizer_model
            .clone()
            .or_else(|| env("DISTILL_SUMMARIZER_MODEL"))
            .unwrap_or_else(|| model.clone());

        let temperature = match overrides.temperature {
            Some(t) => t,
            None => parse_env(env, "DISTILL_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE),
        };
        if !(0.0..=1.0).contains(&temperature) {
            anyhow::bail!("Temperature must be within [0, 1], got {}", temperature);
        }

        let timeout_secs = match overrides.timeout_secs {
            Some(t) => t,
            None => parse_env(env, "DISTILL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            anyhow::bail!("Timeout must be at least 1 second");
        }

        let keep_count = match overrides.keep_count {
            Some(k) => k,
            None => parse_env(env, "DISTILL_KEEP_COUNT")?.unwrap_or(DEFAULT_KEEP_COUNT),
        };
        let chunk_size = match overrides.chunk_size {
            Some(c) => c,
            None => parse_env(env, "DISTILL_CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
        };
        let granularity = CompactionConfig::parse_granularity(
            overrides
                .granularity
                .clone()
                .or_else(|| env("DISTILL_GRANULARITY"))
                .as_deref(),
        )?;
        let compaction = CompactionConfig::new(keep_count, chunk_size, granularity)?;

        Ok(Self {
            api_key: env(API_KEY_VAR),
            base_url: env("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            summarizer_model,
            temperature,
            summarizer_temperature: DEFAULT_SUMMARIZER_TEMPERATURE,
            timeout: Duration::from_secs(timeout_secs),
            compaction,
        })
    }

    /// The credential, or a typed error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, ModelError> {
        self.api_key.as_deref().ok_or_else(|| ModelError::MissingApiKey {
            var: API_KEY_VAR.to_string(),
        })
    }

    /// Human-readable effective configuration, credential masked.
    pub fn describe(&self) -> String {
        format!(
            "base_url           {}\n\
             model              {}\n\
             summarizer_model   {}\n\
             temperature        {}\n\
             timeout            {}s\n\
             keep_count         {}\n\
             chunk_size         {}\n\
             granularity        {}\n\
             api_key            {}",
            self.base_url,
            self.model,
            self.summarizer_model,
            self.temperature,
            self.timeout.as_secs(),
            self.compaction.keep_count,
            self.compaction.chunk_size,
            self.compaction.granularity,
            if self.api_key.is_some() { "set" } else { "not set" },
        )
    }
}

/// Parse an optional environment value, with a contextual error naming the
/// variable on malformed input.
fn parse_env<T: std::str::FromStr>(
    env: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
