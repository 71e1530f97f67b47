//! Shared LLM access layer: provider clients (Ollama, OpenAI), env-driven
//! model configs, fast/slow profiles, health probes and tracing setup.

pub mod config {
    pub mod default_config;
    pub mod llm_model_config;
    pub mod llm_provider;
}

pub mod services {
    pub mod ollama_service;
    pub mod open_ai_service;
}

pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod telemetry;

pub use error_handler::AiLlmError;
pub use service_profiles::{LlmProfile, LlmServiceProfiles};

/// Shape of the text a provider is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Free-form text.
    #[default]
    Text,
    /// A single JSON object (provider-side JSON mode).
    Json,
}
