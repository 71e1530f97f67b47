//! LLM-backed implementation of both answerer contracts.
//!
//! The model is asked for one JSON object; the raw text is cleaned of code
//! fences and surrounding prose, decoded with serde and then field-checked.
//! Anything that does not fit the output schema is an [`AnswererError`].

use std::sync::Arc;

use ai_llm_service::{LlmProfile, LlmServiceProfiles, OutputFormat};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::answerer::{
    CatalogAnswerOutput, CatalogAnswerer, CatalogQuestionInput, ContextualizeInput,
    ContextualizeOutput, ContextualizingAnswerer,
};
use crate::error::AnswererError;
use crate::prompt;

pub struct LlmAnswerer {
    llm: Arc<LlmServiceProfiles>,
    profile: LlmProfile,
}

impl LlmAnswerer {
    pub fn new(llm: Arc<LlmServiceProfiles>, profile: LlmProfile) -> Self {
        Self { llm, profile }
    }

    async fn ask_json(&self, prompt: &str, system: &str) -> Result<String, AnswererError> {
        let raw = self
            .llm
            .generate(self.profile, prompt, Some(system), OutputFormat::Json)
            .await?;
        debug!(profile = ?self.profile, len = raw.len(), "llm reply received");
        Ok(raw)
    }
}

#[async_trait]
impl ContextualizingAnswerer for LlmAnswerer {
    #[instrument(skip_all, fields(profile = ?self.profile))]
    async fn contextualize_and_answer(
        &self,
        input: ContextualizeInput,
    ) -> Result<ContextualizeOutput, AnswererError> {
        let raw = self
            .ask_json(&prompt::contextualize_prompt(&input), prompt::CONTEXTUALIZE_SYSTEM)
            .await?;
        parse_contextualize_output(&raw)
    }
}

#[async_trait]
impl CatalogAnswerer for LlmAnswerer {
    #[instrument(skip_all, fields(profile = ?self.profile))]
    async fn answer_from_catalog(
        &self,
        input: CatalogQuestionInput,
    ) -> Result<CatalogAnswerOutput, AnswererError> {
        let raw = self
            .ask_json(&prompt::catalog_prompt(&input), prompt::CATALOG_SYSTEM)
            .await?;
        parse_catalog_output(&raw)
    }
}

/* --------------------- Output decoding --------------------- */

pub fn parse_contextualize_output(raw: &str) -> Result<ContextualizeOutput, AnswererError> {
    let out: ContextualizeOutput = decode(raw)?;
    require_text("contextualized_question", &out.contextualized_question)?;
    require_text("answer", &out.answer)?;
    Ok(out)
}

pub fn parse_catalog_output(raw: &str) -> Result<CatalogAnswerOutput, AnswererError> {
    let out: CatalogAnswerOutput = decode(raw)?;
    require_text("answer", &out.answer)?;
    Ok(out)
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, AnswererError> {
    let clean = cleanup_json_like(raw);
    serde_json::from_str(clean).map_err(|e| {
        warn!(error = %e, "llm reply does not match the output schema");
        AnswererError::MalformedOutput(e.to_string())
    })
}

fn require_text(field: &'static str, value: &str) -> Result<(), AnswererError> {
    if value.trim().is_empty() {
        return Err(AnswererError::Schema {
            field,
            reason: "must not be empty",
        });
    }
    Ok(())
}

/// Strips markdown fences and any prose around the outermost JSON object.
fn cleanup_json_like(s: &str) -> &str {
    let mut t = s.trim();
    if let Some(rest) = t.strip_prefix("```") {
        t = rest.strip_prefix("json").unwrap_or(rest);
        if let Some(pos) = t.rfind("```") {
            t = &t[..pos];
        }
        t = t.trim();
    }
    match (t.find('{'), t.rfind('}')) {
        (Some(start), Some(end)) if start < end => &t[start..=end],
        _ => t,
    }
}
