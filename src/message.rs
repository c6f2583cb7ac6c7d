//! Conversation turn records.
//!
//! A `Turn` is one message in the conversation: a role plus text, immutable once
//! created. The history is an ordered `Vec<Turn>` owned by the interactive loop;
//! it grows by append only and is never mutated in place — compaction reads it
//! and produces a new, shorter sequence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

/// One message in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// When the turn was recorded. Not part of the wire format.
    #[serde(skip, default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn with the given role.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// Render this turn as a single transcript line for summarization input.
    ///
    /// A turn with empty text still renders a structural line, so joining a
    /// span of turns never fails on missing content.
    pub fn transcript_line(&self) -> String {
        if self.text.is_empty() {
            format!("{}: [no content]", self.role)
        } else {
            format!("{}: {}", self.role, self.text)
        }
    }
}

/// Join a span of turns into one newline-separated transcript blob,
/// preserving original order.
pub fn join_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(Turn::transcript_line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Turn::user("hi").role, Role::User);
        assert_eq!(Turn::assistant("hello").role, Role::Assistant);
        assert_eq!(Turn::system("[Summary] ...").role, Role::System);
    }

    #[test]
    fn test_transcript_line() {
        let turn = Turn::user("what is rust?");
        assert_eq!(turn.transcript_line(), "user: what is rust?");
    }

    #[test]
    fn test_transcript_line_empty_text_has_structural_fallback() {
        let turn = Turn::assistant("");
        assert_eq!(turn.transcript_line(), "assistant: [no content]");
    }

    #[test]
    fn test_join_transcript_preserves_order() {
        let turns = vec![
            Turn::user("first"),
            Turn::assistant("second"),
            Turn::user("third"),
        ];
        assert_eq!(
            join_transcript(&turns),
            "user: first\nassistant: second\nuser: third"
        );
    }

    #[test]
    fn test_join_transcript_empty_span() {
        assert_eq!(join_transcript(&[]), "");
    }

    #[test]
    fn test_serde_roundtrip_skips_timestamp() {
        let turn = Turn::user("hello");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("created_at"));

        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(back.role, Role::User);
        assert_eq!(back.text, "hello");
    }
}
