//! Interactive terminal loop.
//!
//! Reads one line per turn, appends it to the session history, invokes the
//! compacting agent, and appends the reply. The history is the single growing
//! store for the conversation; any one turn's failure is reported and the loop
//! continues — the process and the history survive.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use std::sync::Arc;
use uuid::Uuid;

use crate::agent::CompactingAgent;
use crate::compaction::Compactor;
use crate::config::Settings;
use crate::llm::{BriefSummarizer, ChatModel, OpenAiClient};
use crate::message::Turn;

/// Case-insensitive keywords that end the session.
const EXIT_KEYWORDS: &[&str] = &["quit", "exit"];

/// One interactive conversation.
pub struct ChatSession {
    id: Uuid,
    history: Vec<Turn>,
    turn: u32,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Vec::new(),
            turn: 0,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Append a user turn and return the current message count.
    pub fn record_user(&mut self, text: impl Into<String>) -> usize {
        self.history.push(Turn::user(text));
        self.history.len()
    }

    /// Append an assistant turn and return the current message count.
    pub fn record_reply(&mut self, text: impl Into<String>) -> usize {
        self.history.push(Turn::assistant(text));
        self.history.len()
    }

    fn next_turn(&mut self) -> u32 {
        self.turn += 1;
        self.turn
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether an input line ends the session.
pub fn is_exit_keyword(input: &str) -> bool {
    let lowered = input.trim().to_lowercase();
    EXIT_KEYWORDS.contains(&lowered.as_str())
}

/// Build the agent stack from resolved settings.
fn build_agent(settings: &Settings) -> Result<CompactingAgent> {
    let api_key = settings.require_api_key()?;

    let model: Arc<dyn ChatModel> = Arc::new(OpenAiClient::new(
        &settings.base_url,
        api_key,
        &settings.model,
        settings.temperature,
        settings.timeout,
    )?);
    let summarizer_model: Arc<dyn ChatModel> = Arc::new(OpenAiClient::new(
        &settings.base_url,
        api_key,
        &settings.summarizer_model,
        settings.summarizer_temperature,
        settings.timeout,
    )?);

    let compactor = Compactor::new(
        Arc::new(BriefSummarizer::new(summarizer_model)),
        settings.compaction,
    );
    Ok(CompactingAgent::new(model, compactor))
}

/// Run the interactive chat loop until the user exits.
pub async fn run(settings: &Settings) -> Result<()> {
    let agent = build_agent(settings)?;
    let mut session = ChatSession::new();

    tracing::info!(session = %session.id(), model = %settings.model, "chat session started");

    println!("{}", "=".repeat(60));
    println!("distill — chat with compacted context");
    println!("{}", "=".repeat(60));
    println!("Type 'quit' to exit.\n");

    loop {
        let turn = session.next_turn();
        let input: String = Input::new()
            .with_prompt(format!("[Turn {}] You", turn))
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        if is_exit_keyword(&input) {
            println!("Exiting...");
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let count_before = session.record_user(input.trim());
        println!(
            "  {}",
            style(format!("Messages before call: {}", count_before)).dim()
        );

        match agent.invoke(session.history()).await {
            Ok(reply) => {
                let count_after = session.record_reply(reply.clone());
                println!("\n{} {}\n", style("Agent:").bold().cyan(), reply);
                println!(
                    "  {}",
                    style(format!("Messages after call: {}", count_after)).dim()
                );
            }
            Err(err) => {
                // This turn failed; the history is intact and the loop goes on
                println!("  {} {}\n", style("Error:").red().bold(), err);
            }
        }
    }

    tracing::info!(session = %session.id(), turns = session.turn, "chat session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    #[test]
    fn test_exit_keywords_case_insensitive() {
        assert!(is_exit_keyword("quit"));
        assert!(is_exit_keyword("QUIT"));
        assert!(is_exit_keyword("  Exit  "));
        assert!(!is_exit_keyword("quitting"));
        assert!(!is_exit_keyword(""));
    }

    #[test]
    fn test_session_appends_in_order() {
        let mut session = ChatSession::new();
        assert_eq!(session.record_user("hello"), 1);
        assert_eq!(session.record_reply("hi there"), 2);
        assert_eq!(session.record_user("how are you?"), 3);

        let roles: Vec<Role> = session.history().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(session.history()[1].text, "hi there");
    }

    #[test]
    fn test_turn_counter_increments() {
        let mut session = ChatSession::new();
        assert_eq!(session.next_turn(), 1);
        assert_eq!(session.next_turn(), 2);
    }

    #[test]
    fn test_build_agent_requires_api_key() {
        let settings = Settings::resolve_from(&|_| None, &Default::default()).unwrap();
        assert!(build_agent(&settings).is_err());
    }
}
