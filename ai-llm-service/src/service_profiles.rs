//! Shared LLM service with two profiles: `fast` and `slow`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - If `slow` profile is not provided, it falls back to `fast`.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::OutputFormat;
//! use ai_llm_service::service_profiles::{LlmProfile, LlmServiceProfiles};
//! use ai_llm_service::config::llm_model_config::LlmModelConfig;
//! use ai_llm_service::config::llm_provider::LlmProvider;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fast = LlmModelConfig {
//!     provider: LlmProvider::Ollama,
//!     model: "qwen3:14b".into(),
//!     endpoint: "http://localhost:11434".into(),
//!     api_key: None,
//!     max_tokens: Some(512),
//!     temperature: Some(0.7),
//!     top_p: Some(0.9),
//!     timeout_secs: Some(30),
//! };
//!
//! let svc = Arc::new(LlmServiceProfiles::new(fast, None, Some(10))?);
//! let txt = svc.generate(LlmProfile::Fast, "Hello world", None, OutputFormat::Text).await?;
//! println!("FAST: {}", txt);
//! # Ok(()) }
//! ```

use std::{collections::HashMap, str::FromStr, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    OutputFormat,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError},
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Logical model profile a caller asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProfile {
    /// Drafting / cheap calls.
    #[default]
    Fast,
    /// Quality calls; same as `Fast` when no slow profile is configured.
    Slow,
}

impl FromStr for LlmProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(LlmProfile::Fast),
            "slow" => Ok(LlmProfile::Slow),
            _ => Err(ConfigError::InvalidFormat {
                var: "ANSWER_PROFILE",
                reason: "expected `fast` or `slow`",
            }),
        }
    }
}

/// Shared service that manages two logical LLM profiles: **fast** and **slow**.
///
/// Internally, it caches Ollama/OpenAI clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
pub struct LlmServiceProfiles {
    fast: LlmModelConfig,
    slow: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with two profiles.
    ///
    /// - `fast`: required fast profile.
    /// - `slow_opt`: optional slow profile. If `None`, falls back to `fast`.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    pub fn new(
        fast: LlmModelConfig,
        slow_opt: Option<LlmModelConfig>,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        let slow = slow_opt.unwrap_or_else(|| fast.clone());

        Ok(Self {
            fast,
            slow,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text with the requested profile.
    ///
    /// # Arguments
    /// - `profile`: which model profile to call.
    /// - `prompt`: input text prompt.
    /// - `system`: optional system instruction.
    /// - `format`: plain text or a single JSON object.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if client construction or generation fails.
    pub async fn generate(
        &self,
        profile: LlmProfile,
        prompt: &str,
        system: Option<&str>,
        format: OutputFormat,
    ) -> Result<String, AiLlmError> {
        let cfg = match profile {
            LlmProfile::Fast => &self.fast,
            LlmProfile::Slow => &self.slow,
        };
        debug!(?profile, model = %cfg.model, "dispatching generation");
        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(cfg).await?;
                cli.generate(prompt, system, format).await
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(cfg).await?;
                cli.generate(prompt, system, format).await
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// If the slow profile equals the fast profile, it is checked only once.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(2);
        list.push(self.fast.clone());
        if self.slow != self.fast {
            list.push(self.slow.clone());
        }
        self.health.check_many(&list).await
    }

    /// Returns references to the current profiles `(fast, slow)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.fast, &self.slow)
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "small".into(),
            endpoint: "http://127.0.0.1:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(1),
        }
    }

    #[test]
    fn slow_falls_back_to_fast() {
        let svc = LlmServiceProfiles::new(fast(), None, Some(1)).unwrap();
        let (f, s) = svc.profiles();
        assert_eq!(f, s);
    }

    #[test]
    fn profile_parsing() {
        assert_eq!("SLOW".parse::<LlmProfile>().unwrap(), LlmProfile::Slow);
        assert_eq!("fast".parse::<LlmProfile>().unwrap(), LlmProfile::Fast);
        assert!("medium".parse::<LlmProfile>().is_err());
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let svc = LlmServiceProfiles::new(fast(), None, Some(1)).unwrap();
        let a = svc.get_or_init_ollama(&svc.fast).await.unwrap();
        let b = svc.get_or_init_ollama(&svc.slow).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.ollama.read().await.len(), 1);
    }
}
