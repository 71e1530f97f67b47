//! Answerer contracts: typed input -> typed output, opaque to the selector.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AnswererError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextualizeInput {
    pub question: String,
    /// Transcript produced by [`crate::history::format_history`].
    pub conversation_history: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextualizeOutput {
    /// One-sentence rephrasing of the question given the history.
    #[serde(alias = "contextualizedQuestion")]
    pub contextualized_question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogQuestionInput {
    pub question: String,
    /// Compact catalog JSON from [`crate::catalog::catalog_for_prompt`].
    pub products: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogAnswerOutput {
    pub answer: String,
    /// Self-reported, nominally in `[0, 1]`; not clamped here.
    pub confidence: f64,
}

/// Answers a follow-up question using the conversation so far.
#[async_trait]
pub trait ContextualizingAnswerer: Send + Sync {
    async fn contextualize_and_answer(
        &self,
        input: ContextualizeInput,
    ) -> Result<ContextualizeOutput, AnswererError>;
}

/// Answers a standalone question from the product catalog.
#[async_trait]
pub trait CatalogAnswerer: Send + Sync {
    async fn answer_from_catalog(
        &self,
        input: CatalogQuestionInput,
    ) -> Result<CatalogAnswerOutput, AnswererError>;
}
