//! Default LLM configs loaded strictly from environment variables.
//!
//! This module provides convenience constructors for [`LlmModelConfig`],
//! grouped by provider and role:
//!
//! - **Slow** → high-quality, slower model (final answers)
//! - **Fast** → lower-quality, faster model (drafting, rephrasing)
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`         = provider kind (`ollama`, `openai`/`chatgpt`; default `ollama`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (u64, default 120)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `OLLAMA_MODEL`                = slow/quality model (mandatory)
//! - `OLLAMA_MODEL_FAST`           = fast model (optional, falls back to `OLLAMA_MODEL`)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY`    = API key (mandatory)
//! - `OPENAI_BASE_URL`   = endpoint (default `https://api.openai.com`)
//! - `OPENAI_MODEL`      = slow/quality model (mandatory)
//! - `OPENAI_MODEL_FAST` = fast model (optional, falls back to `OPENAI_MODEL`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt, env_opt_u32, env_opt_u64, must_env},
};

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";

/// Reads `LLM_KIND`, defaulting to Ollama when unset.
///
/// # Errors
/// [`ConfigError::UnsupportedProvider`] for unknown values.
pub fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match env_opt("LLM_KIND") {
        Some(kind) => Ok(kind.parse::<LlmProvider>()?),
        None => Ok(LlmProvider::Ollama),
    }
}

/// Builds the `(fast, slow)` pair for the provider selected by `LLM_KIND`.
///
/// Both configs are validated before they are returned.
pub fn configs_from_env() -> Result<(LlmModelConfig, LlmModelConfig), AiLlmError> {
    let (fast, slow) = match provider_from_env()? {
        LlmProvider::Ollama => (config_ollama_fast()?, config_ollama_slow()?),
        LlmProvider::OpenAI => (config_openai_fast()?, config_openai_slow()?),
    };
    fast.validate()?;
    slow.validate()?;
    Ok((fast, slow))
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Err(AiLlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

fn timeout_from_env() -> Result<u64, AiLlmError> {
    Ok(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS))
}

/// Constructs a config for the **slow/quality** Ollama model.
///
/// # Defaults
/// - `temperature = Some(0.2)`
pub fn config_ollama_slow() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: must_env("OLLAMA_MODEL")?,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(timeout_from_env()?),
    })
}

/// Constructs a config for the **fast/speed** Ollama model.
///
/// # Defaults
/// - `temperature = Some(0.4)`
/// - `top_p = Some(0.9)`
pub fn config_ollama_fast() -> Result<LlmModelConfig, AiLlmError> {
    let model = match env_opt("OLLAMA_MODEL_FAST") {
        Some(m) => m,
        None => must_env("OLLAMA_MODEL")?,
    };

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint: ollama_endpoint()?,
        api_key: None,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.4),
        top_p: Some(0.9),
        timeout_secs: Some(timeout_from_env()?),
    })
}

/// Constructs a config for the **slow/quality** OpenAI model.
pub fn config_openai_slow() -> Result<LlmModelConfig, AiLlmError> {
    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: must_env("OPENAI_MODEL")?,
        endpoint: env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.into()),
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(timeout_from_env()?),
    })
}

/// Constructs a config for the **fast/speed** OpenAI model.
pub fn config_openai_fast() -> Result<LlmModelConfig, AiLlmError> {
    let model = match env_opt("OPENAI_MODEL_FAST") {
        Some(m) => m,
        None => must_env("OPENAI_MODEL")?,
    };

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint: env_opt("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE.into()),
        api_key: Some(must_env("OPENAI_API_KEY")?),
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.4),
        top_p: Some(0.9),
        timeout_secs: Some(timeout_from_env()?),
    })
}
