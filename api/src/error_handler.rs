use ai_llm_service::AiLlmError;
use axum::response::{IntoResponse, Response};
use support_flows::SessionError;
use thiserror::Error;
use tracing::error;
use user_auth::AuthError;

use crate::core::http::response_envelope::{ApiResponse, ErrorCode};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    // --- IO / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn error_code(&self) -> ErrorCode {
        match self {
            AppError::EmptyQuestion | AppError::Session(SessionError::EmptyQuestion) => {
                ErrorCode::EmptyQuestion
            }
            AppError::Unauthorized | AppError::Auth(AuthError::InvalidCredentials) => {
                ErrorCode::Unauthorized
            }
            AppError::Auth(AuthError::InvalidEmail | AuthError::EmptyPassword) => {
                ErrorCode::BadRequest
            }
            AppError::Auth(AuthError::EmailTaken) => ErrorCode::EmailTaken,
            AppError::Session(SessionError::Busy) => ErrorCode::SessionBusy,

            // store/hash failures, startup-only or unexpected
            AppError::Auth(_)
            | AppError::Session(SessionError::NoPendingTurn)
            | AppError::Config(_)
            | AppError::Llm(_)
            | AppError::Bind { .. }
            | AppError::Server(_)
            | AppError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.error_code();
        let message = if code.status().is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };
        ApiResponse::failure(code, message, Vec::new()).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn auth_errors_map_to_client_statuses() {
        let cases = [
            (AppError::from(AuthError::EmailTaken), StatusCode::CONFLICT, ErrorCode::EmailTaken),
            (
                AppError::from(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
            ),
            (
                AppError::from(AuthError::InvalidEmail),
                StatusCode::BAD_REQUEST,
                ErrorCode::BadRequest,
            ),
            (
                AppError::from(AuthError::Hashing("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::Internal,
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn busy_session_is_conflict() {
        let err = AppError::from(SessionError::Busy);
        assert_eq!(err.error_code(), ErrorCode::SessionBusy);
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
