//! `/auth/*`: account signup, login, logout and identity lookup.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use serde_json::{Value, json};
use tracing::info;
use user_auth::User;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::AppResult,
    middleware_layer::auth::AuthUser,
    routes::auth::auth_request::{AuthResponse, CredentialsRequest},
};

/// Handler: POST /auth/signup
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/auth/signup \
///   -H 'content-type: application/json' \
///   -d '{"email":"ann@example.com","password":"secret"}'
/// ```
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.auth.signup(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session.into()))
}

/// Handler: POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.auth.login(&body.email, &body.password).await?;
    Ok(ApiResponse::success(session.into()))
}

/// Handler: POST /auth/logout (bearer)
///
/// The server-side chat transcript is kept; it belongs to the account, not
/// the token.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> ApiResponse<Value> {
    state.auth.logout(&user.token).await;
    info!(email = %user.email, "user logged out");
    ApiResponse::success(json!({}))
}

/// Handler: GET /auth/me (bearer)
pub async fn me(Extension(user): Extension<AuthUser>) -> ApiResponse<User> {
    ApiResponse::success(User { email: user.email })
}
