use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use user_auth::{Session, User};

/// Request payload for `/auth/signup` and `/auth/login`.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Issued bearer session.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

impl From<Session> for AuthResponse {
    fn from(s: Session) -> Self {
        Self {
            token: s.token,
            user: s.user,
            expires_at: s.expires_at,
        }
    }
}
