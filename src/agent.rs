//! The compacting invocation wrapper.
//!
//! Sits between the interactive loop and the main model: every outbound
//! request gets a compacted copy of the message list, and a failure on the
//! compacted call is retried once with the original list — compaction must
//! never be the cause of an otherwise-avoidable total failure.

use std::sync::Arc;

use crate::compaction::Compactor;
use crate::errors::AgentError;
use crate::llm::ChatModel;
use crate::message::Turn;

/// Wraps a [`ChatModel`] with the compaction policy.
///
/// Both collaborators are injected at construction. The wrapper operates on a
/// derived copy of the history and never mutates the caller's list.
pub struct CompactingAgent {
    model: Arc<dyn ChatModel>,
    compactor: Compactor,
}

impl CompactingAgent {
    pub fn new(model: Arc<dyn ChatModel>, compactor: Compactor) -> Self {
        Self { model, compactor }
    }

    pub fn compactor(&self) -> &Compactor {
        &self.compactor
    }

    /// Forward one request through compaction to the main model.
    ///
    /// - An empty history forwards untouched (no-op fast path).
    /// - A failure with the compacted list is retried exactly once with the
    ///   original, uncompacted list before surfacing
    ///   [`AgentError::Forwarding`].
    pub async fn invoke(&self, history: &[Turn]) -> Result<String, AgentError> {
        if history.is_empty() {
            return self
                .model
                .complete(history)
                .await
                .map_err(AgentError::Forwarding);
        }

        let compacted = self.compactor.compact(history).await;
        tracing::debug!(
            original = history.len(),
            compacted = compacted.len(),
            "forwarding request"
        );

        match self.model.complete(&compacted).await {
            Ok(reply) => Ok(reply),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "compacted call failed, retrying with original messages"
                );
                self.model
                    .complete(history)
                    .await
                    .map_err(AgentError::Forwarding)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compaction::{CompactionConfig, SUMMARY_PREFIX};
    use crate::errors::ModelError;
    use crate::llm::Summarize;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OkSummarizer;

    #[async_trait]
    impl Summarize for OkSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, ModelError> {
            Ok("earlier conversation".to_string())
        }
    }

    /// Scripted model: fails the first `fail_first` calls, records every
    /// message list it receives.
    struct FakeModel {
        calls: AtomicUsize,
        fail_first: usize,
        seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl FakeModel {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        async fn complete(&self, turns: &[Turn]) -> Result<String, ModelError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(turns.to_vec());
            if n < self.fail_first {
                Err(ModelError::Api {
                    status: 500,
                    message: "scripted failure".to_string(),
                })
            } else {
                Ok(format!("reply {}", n))
            }
        }
    }

    fn agent(model: Arc<FakeModel>) -> CompactingAgent {
        let compactor = Compactor::new(Arc::new(OkSummarizer), CompactionConfig::default());
        CompactingAgent::new(model, compactor)
    }

    fn history(n: usize) -> Vec<Turn> {
        (1..=n).map(|i| Turn::user(format!("message {}", i))).collect()
    }

    #[tokio::test]
    async fn empty_history_forwards_untouched() {
        // Scenario E
        let model = Arc::new(FakeModel::new(0));
        let a = agent(model.clone());

        let reply = a.invoke(&[]).await.unwrap();
        assert_eq!(reply, "reply 0");
        assert_eq!(model.call_count(), 1);
        assert!(model.seen.lock().unwrap()[0].is_empty());
    }

    #[tokio::test]
    async fn forwards_compacted_list_above_threshold() {
        let model = Arc::new(FakeModel::new(0));
        let a = agent(model.clone());

        let input = history(5);
        a.invoke(&input).await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 4); // 1 summary + 3 kept
        assert!(seen[0][0].text.starts_with(SUMMARY_PREFIX));
        // Caller's list is untouched
        assert_eq!(input.len(), 5);
        assert!(!input[0].text.starts_with(SUMMARY_PREFIX));
    }

    #[tokio::test]
    async fn retries_with_original_on_forwarding_failure() {
        // Scenario D: compacted call fails once, original succeeds
        let model = Arc::new(FakeModel::new(1));
        let a = agent(model.clone());

        let input = history(5);
        let reply = a.invoke(&input).await.unwrap();

        assert_eq!(reply, "reply 1");
        assert_eq!(model.call_count(), 2);

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].len(), 4); // compacted attempt
        assert_eq!(seen[1], input); // retry with the original list
    }

    #[tokio::test]
    async fn surfaces_forwarding_error_when_retry_also_fails() {
        let model = Arc::new(FakeModel::new(2));
        let a = agent(model.clone());

        let err = a.invoke(&history(5)).await.unwrap_err();
        assert!(matches!(err, AgentError::Forwarding(_)));
        // Exactly one retry, not a loop
        assert_eq!(model.call_count(), 2);
    }

    #[tokio::test]
    async fn below_threshold_forwards_history_as_is() {
        let model = Arc::new(FakeModel::new(0));
        let a = agent(model.clone());

        let input = history(2);
        a.invoke(&input).await.unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0], input);
        assert_eq!(model.call_count(), 1);
    }
}
