//! Typed error hierarchy for the distill agent.
//!
//! Two top-level enums cover the two failure surfaces:
//! - `ModelError` — remote model call failures (chat completion and summarization)
//! - `AgentError` — per-turn invocation failures surfaced to the interactive loop
//!
//! Summarization failures never appear here as a caller-visible error: the
//! compaction policy recovers them internally via a deterministic truncation
//! fallback.

use thiserror::Error;

/// Errors from a remote model call.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Missing API key: set the {var} environment variable")]
    MissingApiKey { var: String },

    #[error("Request to model endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model endpoint returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model response contained no completion choices")]
    EmptyCompletion,
}

impl ModelError {
    /// Whether this error came from the transport layer (including timeouts),
    /// as opposed to a well-formed rejection from the service.
    pub fn is_transport(&self) -> bool {
        matches!(self, ModelError::Request(_))
    }
}

/// Errors from a single agent invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model call failed after retry with original messages: {0}")]
    Forwarding(#[source] ModelError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
