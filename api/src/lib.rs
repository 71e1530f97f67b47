//! HTTP surface of the support chat.

pub mod core {
    pub mod app_config;
    pub mod app_state;
    pub mod http {
        pub mod response_envelope;
    }
}

pub mod middleware_layer {
    pub mod auth;
    pub mod json_extractor;
}

pub mod routes {
    pub mod auth {
        pub mod auth_request;
        pub mod auth_routes;
    }
    pub mod chat {
        pub mod chat_request;
        pub mod chat_routes;
    }
    pub mod health_route;
}

pub mod error_handler;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    core::{app_config::AppConfig, app_state::AppState},
    error_handler::AppError,
    middleware_layer::{auth::require_auth, json_extractor::json_error_mapper},
    routes::{
        auth::auth_routes::{login, logout, me, signup},
        chat::chat_routes::{ask, clear_messages, list_messages, post_message},
        health_route::health,
    },
};

/// Builds the full router over `state`.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/chat/ask", post(ask))
        .route(
            "/chat/messages",
            post(post_message).get(list_messages).delete(clear_messages),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .merge(protected)
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Loads config from env, wires state and serves until Ctrl+C.
///
/// # Errors
/// Config/LLM setup failures, bind failures and server I/O errors.
pub async fn start() -> Result<(), AppError> {
    let cfg = AppConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&cfg)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.api_address)
        .await
        .map_err(|source| AppError::Bind {
            addr: cfg.api_address.clone(),
            source,
        })?;
    info!(
        address = %cfg.api_address,
        catalog = %cfg.catalog_path.display(),
        "API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
