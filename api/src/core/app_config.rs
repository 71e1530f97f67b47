//! Service settings read from the environment.
//!
//! | variable              | default              |
//! |-----------------------|----------------------|
//! | `API_ADDRESS`         | `127.0.0.1:8080`     |
//! | `CATALOG_PATH`        | `data/products.json` |
//! | `USERS_PATH`          | unset: in-memory     |
//! | `SESSION_TTL_SECS`    | `86400`              |
//! | `CONFIDENCE_POLICY`   | `drop`               |
//! | `ANSWER_PROFILE`      | `fast`               |
//! | `HEALTH_TIMEOUT_SECS` | `10`                 |
//!
//! LLM settings are read separately by `ai_llm_service::config::default_config`.

use std::path::PathBuf;

use ai_llm_service::LlmProfile;
use ai_llm_service::error_handler::{env_opt, env_opt_u64};
use support_flows::ConfidencePolicy;
use user_auth::DEFAULT_SESSION_TTL_SECS;

use crate::error_handler::AppError;

const DEFAULT_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_CATALOG_PATH: &str = "data/products.json";
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_address: String,
    pub catalog_path: PathBuf,
    pub users_path: Option<PathBuf>,
    pub session_ttl_secs: u64,
    pub confidence_policy: ConfidencePolicy,
    pub answer_profile: LlmProfile,
    pub health_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_address: DEFAULT_ADDRESS.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            users_path: None,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            confidence_policy: ConfidencePolicy::default(),
            answer_profile: LlmProfile::default(),
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// # Errors
    /// [`AppError::Config`] / [`AppError::Llm`] for values that do not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(env_opt)?.with_numbers_from_env()
    }

    /// Builds the config from an arbitrary variable lookup, leaving numeric
    /// settings at their defaults.
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut cfg = Self::default();

        if let Some(addr) = get("API_ADDRESS") {
            cfg.api_address = addr.trim().to_string();
        }
        if let Some(path) = get("CATALOG_PATH") {
            cfg.catalog_path = PathBuf::from(path.trim());
        }
        cfg.users_path = get("USERS_PATH").map(|p| PathBuf::from(p.trim()));

        if let Some(raw) = get("CONFIDENCE_POLICY") {
            cfg.confidence_policy = raw.parse().map_err(AppError::Config)?;
        }
        if let Some(raw) = get("ANSWER_PROFILE") {
            cfg.answer_profile = raw
                .parse()
                .map_err(|e: ai_llm_service::error_handler::ConfigError| {
                    AppError::Llm(e.into())
                })?;
        }
        Ok(cfg)
    }

    fn with_numbers_from_env(mut self) -> Result<Self, AppError> {
        if let Some(ttl) = env_opt_u64("SESSION_TTL_SECS")? {
            self.session_ttl_secs = ttl;
        }
        if let Some(secs) = env_opt_u64("HEALTH_TIMEOUT_SECS")? {
            self.health_timeout_secs = secs;
        }
        Ok(self)
    }
}
