//! GET /health: liveness plus a snapshot of the configured LLM backends.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::extract::State;
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when every probed backend is healthy, `degraded` otherwise.
    pub status: &'static str,
    pub llm: Vec<HealthStatus>,
}

/// Handler: GET /health
///
/// Always answers 200; backend problems are reported in the body.
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResponse<HealthResponse> {
    let llm = match &state.llm {
        Some(profiles) => profiles.health_all().await,
        None => Vec::new(),
    };
    let status = if llm.iter().all(|s| s.ok) {
        "ok"
    } else {
        "degraded"
    };
    ApiResponse::success(HealthResponse { status, llm })
}
