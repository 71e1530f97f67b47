//! Domain types shared by the answering flows and their consumers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A catalog record.
///
/// The core schema is fixed; any additional attributes found in the catalog
/// file are kept verbatim in `extra` so newer catalogs still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub features: String,
    pub category: String,
    pub price: f64,
    /// Extension attributes (`"warranty"`, `"colors"`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    /// The assistant side of the conversation.
    Model,
}

/// One message of a past conversation, as handed to the answering flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            content: content.into(),
        }
    }
}

/// Normalized outcome of one answered chat turn.
///
/// Exactly one of `answer` / `error` is set. `confidence` only accompanies
/// answers produced from the catalog without conversation history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotResponseResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BotResponseResult {
    pub fn answered(answer: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            answer: Some(answer.into()),
            confidence,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            answer: None,
            confidence: None,
            error: Some(message.into()),
        }
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Text to show in the transcript: the error message or the answer.
    pub fn display_text(&self) -> &str {
        self.error
            .as_deref()
            .or(self.answer.as_deref())
            .unwrap_or_default()
    }
}

/// Author of a chat message in a session transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A rendered chat message, built by [`crate::session::ChatSession`] only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl ChatMessage {
    /// Maps the message onto the turn shape the answering flows consume.
    pub fn as_turn(&self) -> ConversationTurn {
        ConversationTurn {
            role: match self.sender {
                Sender::User => TurnRole::User,
                Sender::Bot => TurnRole::Model,
            },
            content: self.text.clone(),
        }
    }
}
