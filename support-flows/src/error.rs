//! Error types of the answering flows.

use std::path::PathBuf;

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Catalog could not be produced.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog at {path} is not a valid product list: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode catalog for the prompt: {0}")]
    Encode(#[source] serde_json::Error),
}

/// An answerer could not produce a schema-valid output.
#[derive(Debug, Error)]
pub enum AnswererError {
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error("model output is not valid JSON: {0}")]
    MalformedOutput(String),

    #[error("model output field `{field}` {reason}")]
    Schema {
        field: &'static str,
        reason: &'static str,
    },

    /// Free-form failure raised by custom answerer implementations.
    #[error("{0}")]
    Failed(String),
}

/// Failure inside the selection pipeline; always converted into a
/// `BotResponseResult` error before leaving the selector.
#[derive(Debug, Error)]
pub(crate) enum FlowError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Answerer(#[from] AnswererError),
}

/// Misuse of a [`crate::session::ChatSession`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("a reply is still pending for this chat session")]
    Busy,
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("no turn is pending for this chat session")]
    NoPendingTurn,
}
