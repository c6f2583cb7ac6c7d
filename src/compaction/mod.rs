//! Conversation Compaction System
//!
//! This module keeps the message list sent to the main model bounded by
//! replacing older turns with short synthesized summaries while preserving
//! recent turns verbatim.
//!
//! ## Features
//!
//! - **Threshold Trigger**: compaction fires only when the history exceeds the
//!   configured number of kept messages — below threshold the input passes
//!   through untouched with zero model calls
//! - **Two Granularities**: summarize the whole head in one call (single-shot)
//!   or peel fixed-size chunks off the front, one summary turn per chunk
//!   (chunked); exactly one is active per deployment
//! - **Tagged Summaries**: every synthetic turn is a `system` turn with a
//!   recognizable `[Summary]` prefix, so synthesized context is distinguishable
//!   from original content in logs and downstream
//! - **Local Fallback**: a failed summarization call degrades to deterministic
//!   truncation of the original text — compaction itself never fails
//!
//! ## Usage
//!
//! ```ignore
//! use distill::compaction::{CompactionConfig, Compactor};
//!
//! let compactor = Compactor::new(summarizer, CompactionConfig::default());
//! let compacted = compactor.compact(&history).await;
//! ```

mod config;
mod policy;

pub use config::{CompactionConfig, Granularity};
pub use policy::{Compactor, SummaryOutcome};

/// Prefix marking a synthetic summary turn.
pub const SUMMARY_PREFIX: &str = "[Summary]";

/// Character budget for the local truncation fallback when the remote
/// summarization call fails.
pub const FALLBACK_SUMMARY_CHARS: usize = 400;

/// Default number of most-recent turns kept verbatim.
pub const DEFAULT_KEEP_COUNT: usize = 3;

/// Default turns per chunk in chunked mode.
pub const DEFAULT_CHUNK_SIZE: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert!(FALLBACK_SUMMARY_CHARS > 0);
        assert!(DEFAULT_CHUNK_SIZE >= 1);
        assert!(!SUMMARY_PREFIX.is_empty());
    }
}
