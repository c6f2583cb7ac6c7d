//! The compaction policy: partitioning, summarization, and splicing.

use std::sync::Arc;

use super::config::{CompactionConfig, Granularity};
use super::{FALLBACK_SUMMARY_CHARS, SUMMARY_PREFIX};
use crate::llm::Summarize;
use crate::message::{Turn, join_transcript};

/// The result of one summarization attempt.
///
/// The fallback path is an explicit variant rather than an implicit catch, so
/// call sites branch on it visibly and tests can assert which path was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// The remote summarizer produced this text.
    Generated(String),
    /// The remote call failed; this is the joined original text truncated to
    /// the fixed fallback budget.
    Truncated(String),
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::Generated(text) | SummaryOutcome::Truncated(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SummaryOutcome::Truncated(_))
    }
}

/// Applies the compaction policy to a conversation history.
///
/// The Compactor:
/// 1. Passes histories at or below the keep threshold through untouched
/// 2. Partitions longer histories into a summarized head and a kept tail
/// 3. Summarizes the head through an injected [`Summarize`] capability
/// 4. Degrades to deterministic local truncation when summarization fails
///
/// `compact` is infallible by contract: callers never observe an error.
pub struct Compactor {
    summarizer: Arc<dyn Summarize>,
    config: CompactionConfig,
}

impl Compactor {
    /// Create a compactor with an injected summarizer.
    pub fn new(summarizer: Arc<dyn Summarize>, config: CompactionConfig) -> Self {
        Self { summarizer, config }
    }

    pub fn config(&self) -> &CompactionConfig {
        &self.config
    }

    /// Produce a compacted copy of the history.
    ///
    /// Invariants:
    /// - result = [synthetic summaries in chunk order] + [kept tail in
    ///   original order]
    /// - the kept tail equals the last `keep_count` input turns whenever the
    ///   input exceeds the threshold
    /// - at or below the threshold the input is returned unchanged and no
    ///   summarizer call is made
    pub async fn compact(&self, history: &[Turn]) -> Vec<Turn> {
        if history.len() <= self.config.keep_count {
            return history.to_vec();
        }

        let result = match self.config.granularity {
            Granularity::SingleShot => self.compact_single_shot(history).await,
            Granularity::Chunked => self.compact_chunked(history).await,
        };

        tracing::debug!(
            before = history.len(),
            after = result.len(),
            granularity = %self.config.granularity,
            "compacted history"
        );
        result
    }

    /// Summarize everything before the kept tail in one call.
    async fn compact_single_shot(&self, history: &[Turn]) -> Vec<Turn> {
        let split = history.len() - self.config.keep_count;
        let (head, tail) = history.split_at(split);

        let outcome = self.summarize_span(head).await;
        let mut result = Vec::with_capacity(1 + tail.len());
        result.push(summary_turn(&outcome));
        result.extend_from_slice(tail);
        result
    }

    /// Peel chunks off the front until the remaining head fits in the keep
    /// threshold, one summary turn per chunk.
    ///
    /// The final chunk is clamped so peeling never eats into the last
    /// `keep_count` turns.
    async fn compact_chunked(&self, history: &[Turn]) -> Vec<Turn> {
        let keep = self.config.keep_count;
        let mut result = Vec::new();
        let mut remaining = history;

        while remaining.len() > keep {
            let take = self.config.chunk_size.min(remaining.len() - keep);
            let (chunk, rest) = remaining.split_at(take);
            let outcome = self.summarize_span(chunk).await;
            result.push(summary_turn(&outcome));
            remaining = rest;
        }

        result.extend_from_slice(remaining);
        result
    }

    /// Summarize one span of turns, falling back to local truncation on any
    /// remote failure.
    async fn summarize_span(&self, span: &[Turn]) -> SummaryOutcome {
        let joined = join_transcript(span);
        match self.summarizer.summarize(&joined).await {
            Ok(text) => SummaryOutcome::Generated(text),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    span_turns = span.len(),
                    "summarization failed, using truncation fallback"
                );
                SummaryOutcome::Truncated(truncate_chars(&joined, FALLBACK_SUMMARY_CHARS))
            }
        }
    }
}

/// Build the synthetic system turn carrying a summary.
fn summary_turn(outcome: &SummaryOutcome) -> Turn {
    Turn::system(format!("{} {}", SUMMARY_PREFIX, outcome.text()))
}

/// Truncate to a character budget on a char boundary, marking the cut.
fn truncate_chars(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let truncated: String = text.chars().take(budget).collect();
    format!("{}...", truncated)
}
