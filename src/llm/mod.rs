//! Model capability traits.
//!
//! Both the main conversational model and the summarizer are injected behind
//! traits so the compaction policy and the invocation wrapper can be tested
//! against fakes. The concrete implementation lives in [`openai`].

mod openai;

pub use openai::{BriefSummarizer, OpenAiClient, SUMMARY_INSTRUCTION};

use async_trait::async_trait;

use crate::errors::ModelError;
use crate::message::Turn;

/// The main conversational model: takes an ordered message list, returns the
/// reply text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, turns: &[Turn]) -> Result<String, ModelError>;
}

/// A stateless summarization capability: given a text blob, returns a short
/// synthesized description. Potentially slow, potentially failing — callers
/// must treat an error as recoverable.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, ModelError>;
}
