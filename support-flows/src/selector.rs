//! Response selection: which answerer handles a question, and how its
//! outcome is normalized into a [`BotResponseResult`].
//!
//! - Empty or unreadable catalog: fixed "unavailable" error, no answerer call.
//! - Non-empty history: contextualizing answerer, confidence unset.
//! - No history: catalog answerer over the compact catalog view.
//!
//! Errors never escape [`ResponseSelector::select_response`].

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::answerer::{
    CatalogAnswerer, CatalogQuestionInput, ContextualizeInput, ContextualizingAnswerer,
};
use crate::catalog::{CatalogLoader, catalog_for_prompt};
use crate::error::FlowError;
use crate::history::format_history;
use crate::types::{BotResponseResult, ConversationTurn, Product};

pub const CATALOG_UNAVAILABLE: &str =
    "Product catalog is currently unavailable. Please try again later.";

pub const GENERIC_FAILURE: &str = "Sorry, I encountered an unexpected issue. Please try asking in a different way or try again later.";

/// What to do with a catalog answer whose confidence is outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfidencePolicy {
    /// Keep the answer, unset the confidence.
    #[default]
    Drop,
    /// Clamp into `[0, 1]`; non-finite values are dropped.
    Clamp,
    /// Report whatever the answerer returned.
    PassThrough,
}

impl ConfidencePolicy {
    pub fn apply(self, confidence: f64) -> Option<f64> {
        let in_range = (0.0..=1.0).contains(&confidence);
        match self {
            ConfidencePolicy::PassThrough => Some(confidence),
            _ if in_range => Some(confidence),
            ConfidencePolicy::Clamp if confidence.is_finite() => Some(confidence.clamp(0.0, 1.0)),
            ConfidencePolicy::Clamp | ConfidencePolicy::Drop => None,
        }
    }
}

impl FromStr for ConfidencePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop" => Ok(ConfidencePolicy::Drop),
            "clamp" => Ok(ConfidencePolicy::Clamp),
            "pass_through" | "passthrough" => Ok(ConfidencePolicy::PassThrough),
            other => Err(format!(
                "unknown confidence policy `{other}` (expected drop|clamp|pass_through)"
            )),
        }
    }
}

/// Stateless router between the two answerers.
///
/// Holds only shared handles, so one instance serves concurrent requests.
pub struct ResponseSelector {
    catalog: Arc<dyn CatalogLoader>,
    contextualizer: Arc<dyn ContextualizingAnswerer>,
    catalog_answerer: Arc<dyn CatalogAnswerer>,
    confidence_policy: ConfidencePolicy,
}

impl ResponseSelector {
    pub fn new(
        catalog: Arc<dyn CatalogLoader>,
        contextualizer: Arc<dyn ContextualizingAnswerer>,
        catalog_answerer: Arc<dyn CatalogAnswerer>,
    ) -> Self {
        Self {
            catalog,
            contextualizer,
            catalog_answerer,
            confidence_policy: ConfidencePolicy::default(),
        }
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.confidence_policy = policy;
        self
    }

    pub fn confidence_policy(&self) -> ConfidencePolicy {
        self.confidence_policy
    }

    /// Answers one question.
    ///
    /// `history` holds the turns before `question`. The question itself is not
    /// validated here.
    #[instrument(skip_all, fields(history_len = history.len()))]
    pub async fn select_response(
        &self,
        question: &str,
        history: &[ConversationTurn],
    ) -> BotResponseResult {
        let products = match self.catalog.load().await {
            Ok(products) if !products.is_empty() => products,
            Ok(_) => {
                warn!("catalog is empty");
                return BotResponseResult::failed(CATALOG_UNAVAILABLE);
            }
            Err(err) => {
                warn!(error = %err, "catalog load failed");
                return BotResponseResult::failed(CATALOG_UNAVAILABLE);
            }
        };

        match self.answer(question, history, &products).await {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "answerer failed");
                BotResponseResult::failed(failure_message(&err))
            }
        }
    }

    async fn answer(
        &self,
        question: &str,
        history: &[ConversationTurn],
        products: &[Product],
    ) -> Result<BotResponseResult, FlowError> {
        if !history.is_empty() {
            let out = self
                .contextualizer
                .contextualize_and_answer(ContextualizeInput {
                    question: question.to_string(),
                    conversation_history: format_history(history),
                })
                .await?;
            debug!(contextualized = %out.contextualized_question, "question contextualized");
            return Ok(BotResponseResult::answered(out.answer, None));
        }

        let out = self
            .catalog_answerer
            .answer_from_catalog(CatalogQuestionInput {
                question: question.to_string(),
                products: catalog_for_prompt(products)?,
            })
            .await?;

        let confidence = self.confidence_policy.apply(out.confidence);
        if !(0.0..=1.0).contains(&out.confidence) {
            info!(
                reported = out.confidence,
                kept = ?confidence,
                policy = ?self.confidence_policy,
                "confidence outside [0, 1]"
            );
        }
        Ok(BotResponseResult::answered(out.answer, confidence))
    }
}

fn failure_message(err: &FlowError) -> String {
    let msg = err.to_string();
    if msg.trim().is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_policy_unsets_out_of_range() {
        assert_eq!(ConfidencePolicy::Drop.apply(0.4), Some(0.4));
        assert_eq!(ConfidencePolicy::Drop.apply(1.0), Some(1.0));
        assert_eq!(ConfidencePolicy::Drop.apply(1.2), None);
        assert_eq!(ConfidencePolicy::Drop.apply(-0.1), None);
        assert_eq!(ConfidencePolicy::Drop.apply(f64::NAN), None);
    }

    #[test]
    fn clamp_policy_clamps_finite_values() {
        assert_eq!(ConfidencePolicy::Clamp.apply(1.2), Some(1.0));
        assert_eq!(ConfidencePolicy::Clamp.apply(-3.0), Some(0.0));
        assert_eq!(ConfidencePolicy::Clamp.apply(f64::INFINITY), None);
    }

    #[test]
    fn pass_through_keeps_raw_value() {
        assert_eq!(ConfidencePolicy::PassThrough.apply(7.0), Some(7.0));
    }

    #[test]
    fn policy_parses_from_env_values() {
        assert_eq!("Clamp".parse::<ConfidencePolicy>().unwrap(), ConfidencePolicy::Clamp);
        assert_eq!(
            "pass_through".parse::<ConfidencePolicy>().unwrap(),
            ConfidencePolicy::PassThrough
        );
        assert!("strict".parse::<ConfidencePolicy>().is_err());
    }

    #[test]
    fn blank_error_message_uses_generic_fallback() {
        let err = FlowError::Answerer(crate::error::AnswererError::Failed("  ".into()));
        assert_eq!(failure_message(&err), GENERIC_FAILURE);
    }
}
