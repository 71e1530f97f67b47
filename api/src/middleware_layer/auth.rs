//! Bearer-token authentication for protected routes.
//!
//! Validates `Authorization: Bearer <token>` against [`user_auth::AuthService`]
//! and stores the resolved [`AuthUser`] in request extensions.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::core::app_state::AppState;
use crate::error_handler::AppError;

/// Caller identity injected by [`require_auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub token: String,
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(&req).map(str::to_string) else {
        debug!("missing bearer token");
        return AppError::Unauthorized.into_response();
    };

    let Some(user) = state.auth.authenticate(&token).await else {
        debug!("unknown or expired bearer token");
        return AppError::Unauthorized.into_response();
    };

    req.extensions_mut().insert(AuthUser {
        email: user.email,
        token,
    });
    next.run(req).await
}
