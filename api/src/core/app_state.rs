use std::collections::HashMap;
use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use ai_llm_service::config::default_config::configs_from_env;
use support_flows::catalog::JsonFileCatalog;
use support_flows::llm_answerer::LlmAnswerer;
use support_flows::{ChatSession, ResponseSelector};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use user_auth::{Argon2Hasher, AuthService, InMemoryUserStore, JsonFileUserStore, UserStore};

use crate::core::app_config::AppConfig;
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub selector: Arc<ResponseSelector>,
    pub auth: Arc<AuthService>,
    /// LLM profiles for `/health`; `None` when answerers are not LLM-backed.
    pub llm: Option<Arc<LlmServiceProfiles>>,
    /// Server-side transcripts keyed by user email.
    chats: RwLock<HashMap<String, Arc<Mutex<ChatSession>>>>,
}

impl AppState {
    pub fn new(
        selector: Arc<ResponseSelector>,
        auth: Arc<AuthService>,
        llm: Option<Arc<LlmServiceProfiles>>,
    ) -> Self {
        Self {
            selector,
            auth,
            llm,
            chats: RwLock::new(HashMap::new()),
        }
    }

    /// Wires the production graph: env LLM profiles, JSON catalog, Argon2 auth.
    ///
    /// # Errors
    /// [`AppError::Llm`] if the LLM configuration is missing or invalid.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let (fast, slow) = configs_from_env()?;
        info!(
            provider = ?fast.provider,
            fast_model = %fast.model,
            slow_model = %slow.model,
            profile = ?cfg.answer_profile,
            "LLM profiles loaded"
        );
        let llm = Arc::new(LlmServiceProfiles::new(
            fast,
            Some(slow),
            Some(cfg.health_timeout_secs),
        )?);

        let answerer = Arc::new(LlmAnswerer::new(llm.clone(), cfg.answer_profile));
        let selector = ResponseSelector::new(
            Arc::new(JsonFileCatalog::new(&cfg.catalog_path)),
            answerer.clone(),
            answerer,
        )
        .with_confidence_policy(cfg.confidence_policy);

        let store: Arc<dyn UserStore> = match &cfg.users_path {
            Some(path) => {
                info!(path = %path.display(), "using JSON user store");
                Arc::new(JsonFileUserStore::new(path))
            }
            None => {
                info!("using in-memory user store");
                Arc::new(InMemoryUserStore::new())
            }
        };
        let auth = AuthService::new(store, Arc::new(Argon2Hasher::new()), cfg.session_ttl_secs);

        Ok(Self::new(Arc::new(selector), Arc::new(auth), Some(llm)))
    }

    /// Returns the user's transcript, creating an empty one on first use.
    pub async fn chat_session(&self, email: &str) -> Arc<Mutex<ChatSession>> {
        if let Some(session) = self.chats.read().await.get(email) {
            return session.clone();
        }
        self.chats
            .write()
            .await
            .entry(email.to_string())
            .or_default()
            .clone()
    }
}
