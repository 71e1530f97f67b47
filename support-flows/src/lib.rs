//! Catalog-grounded answering for the support chat.
//!
//! [`selector::ResponseSelector`] loads the catalog and routes a question to
//! one of two answerers; [`session::ChatSession`] keeps the per-user
//! transcript that feeds it.

pub mod answerer;
pub mod catalog;
pub mod error;
pub mod history;
pub mod llm_answerer;
pub mod prompt;
pub mod selector;
pub mod session;
pub mod types;

pub use error::{AnswererError, CatalogError, SessionError};
pub use selector::{ConfidencePolicy, ResponseSelector};
pub use session::ChatSession;
pub use types::{BotResponseResult, ChatMessage, ConversationTurn, Product};
