use serde::{Deserialize, Serialize};
use support_flows::{ChatMessage, ConversationTurn};

/// Request payload for `/chat/ask`: the client keeps its own history.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    /// Turns before `question`, oldest first.
    #[serde(default)]
    pub history: Vec<ConversationTurn>,
}

/// Request payload for `POST /chat/messages`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub user_message: ChatMessage,
    pub bot_message: ChatMessage,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<ChatMessage>,
}
