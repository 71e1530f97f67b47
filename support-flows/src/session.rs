//! Per-user chat transcript.
//!
//! A turn is split into [`ChatSession::begin_turn`] and
//! [`ChatSession::complete_turn`] so a shared session can be unlocked while
//! the selector awaits the LLM. At most one turn is in flight per session.

use chrono::Utc;
use uuid::Uuid;

use crate::error::SessionError;
use crate::selector::ResponseSelector;
use crate::types::{BotResponseResult, ChatMessage, ConversationTurn, Sender};

/// Everything the selector needs for the turn that was just opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub question: String,
    /// Messages before the question, oldest first.
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Appends the user message and returns the turn to answer.
    ///
    /// # Errors
    /// - [`SessionError::EmptyQuestion`] for blank input.
    /// - [`SessionError::Busy`] while a previous turn is unanswered.
    pub fn begin_turn(&mut self, question: &str) -> Result<PendingTurn, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.awaiting_reply {
            return Err(SessionError::Busy);
        }

        let history = self.messages.iter().map(ChatMessage::as_turn).collect();
        self.messages.push(new_message(Sender::User, question, None));
        self.awaiting_reply = true;

        Ok(PendingTurn {
            question: question.to_string(),
            history,
        })
    }

    /// Appends the bot reply for the open turn.
    ///
    /// # Errors
    /// [`SessionError::NoPendingTurn`] if no turn was begun.
    pub fn complete_turn(
        &mut self,
        result: &BotResponseResult,
    ) -> Result<ChatMessage, SessionError> {
        if !self.awaiting_reply {
            return Err(SessionError::NoPendingTurn);
        }
        let msg = new_message(Sender::Bot, result.display_text(), result.confidence());
        self.messages.push(msg.clone());
        self.awaiting_reply = false;
        Ok(msg)
    }

    /// Begins, answers and completes one turn.
    pub async fn submit(
        &mut self,
        selector: &ResponseSelector,
        question: &str,
    ) -> Result<ChatMessage, SessionError> {
        let turn = self.begin_turn(question)?;
        let result = selector.select_response(&turn.question, &turn.history).await;
        self.complete_turn(&result)
    }

    /// Drops the transcript and any open turn.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.awaiting_reply = false;
    }
}

fn new_message(sender: Sender, text: &str, confidence: Option<f64>) -> ChatMessage {
    let prefix = match sender {
        Sender::User => "user",
        Sender::Bot => "bot",
    };
    ChatMessage {
        id: format!("{prefix}-{}", Uuid::new_v4()),
        sender,
        text: text.to_string(),
        timestamp: Utc::now().timestamp_millis(),
        confidence,
    }
}
