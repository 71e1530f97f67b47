//! Signup, login and bearer sessions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::hasher::{CredentialHasher, hash_blocking};
use crate::store::{StoredUser, User, UserStore};

/// Default session lifetime: one day.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;

/// A live login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: TimeDelta,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn CredentialHasher>,
        session_ttl_secs: u64,
    ) -> Self {
        let ttl = i64::try_from(session_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX);
        Self {
            store,
            hasher,
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Registers a new account and logs it in.
    ///
    /// # Errors
    /// Input validation errors, [`AuthError::EmailTaken`], or store/hash failures.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        require_password(password)?;

        if self.store.find_by_email(&email).await?.is_some() {
            warn!(%email, "signup for existing email");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_blocking(self.hasher.clone(), password).await?;
        let record = StoredUser {
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        let user = record.user();
        self.store.create(record).await?;
        info!(%email, "user registered");

        Ok(self.open_session(user).await)
    }

    /// # Errors
    /// [`AuthError::InvalidCredentials`] for unknown email or wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        require_password(password)?;

        let Some(user) = self
            .store
            .verify_credential(&email, password, self.hasher.clone())
            .await?
        else {
            warn!(%email, "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        info!(%email, "user logged in");
        Ok(self.open_session(user).await)
    }

    /// Ends a session. Returns `false` if the token was not live.
    pub async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token).is_some();
        debug!(removed, "logout");
        removed
    }

    /// Resolves a bearer token to its user; expired tokens are forgotten.
    pub async fn authenticate(&self, token: &str) -> Option<User> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                None => return None,
                Some(s) if s.expires_at > now => return Some(s.user.clone()),
                Some(_) => {}
            }
        }
        self.sessions.write().await.remove(token);
        debug!("expired session dropped");
        None
    }

    async fn open_session(&self, user: User) -> Session {
        let issued_at = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user,
            issued_at,
            expires_at: issued_at.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > issued_at);
        sessions.insert(session.token.clone(), session.clone());
        session
    }
}

/// Trims and lower-cases; requires a non-empty local part and domain around `@`.
pub fn normalize_email(raw: &str) -> Result<String, AuthError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AuthError::InvalidEmail),
    }
}

fn require_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Argon2Hasher;
    use crate::store::InMemoryUserStore;

    fn service(ttl: u64) -> AuthService {
        AuthService::new(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
            ttl,
        )
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ann@Example.COM ").unwrap(), "ann@example.com");
        assert!(matches!(normalize_email("ann"), Err(AuthError::InvalidEmail)));
        assert!(matches!(normalize_email("@example.com"), Err(AuthError::InvalidEmail)));
        assert!(matches!(normalize_email("   "), Err(AuthError::InvalidEmail)));
    }

    #[tokio::test]
    async fn signup_logs_in_and_token_authenticates() {
        let svc = service(DEFAULT_SESSION_TTL_SECS);
        let s = svc.signup("Ann@Example.com", "pw").await.unwrap();
        assert_eq!(s.user.email, "ann@example.com");
        assert!(s.expires_at > s.issued_at);
        assert_eq!(svc.authenticate(&s.token).await, Some(s.user.clone()));
    }

    #[tokio::test]
    async fn duplicate_signup_is_rejected_case_insensitively() {
        let svc = service(DEFAULT_SESSION_TTL_SECS);
        svc.signup("ann@example.com", "pw").await.unwrap();
        let err = svc.signup(" ANN@example.com", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
        assert_eq!(err.to_string(), "Email already exists.");
    }

    #[tokio::test]
    async fn login_checks_password() {
        let svc = service(DEFAULT_SESSION_TTL_SECS);
        svc.signup("ann@example.com", "pw").await.unwrap();

        assert!(svc.login("ann@example.com", "pw").await.is_ok());
        let err = svc.login("ann@example.com", "PW").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
        assert!(matches!(
            svc.login("bob@example.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("ann@example.com", "").await,
            Err(AuthError::EmptyPassword)
        ));
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let svc = service(DEFAULT_SESSION_TTL_SECS);
        let s = svc.signup("ann@example.com", "pw").await.unwrap();
        assert!(svc.logout(&s.token).await);
        assert!(!svc.logout(&s.token).await);
        assert_eq!(svc.authenticate(&s.token).await, None);
    }

    #[tokio::test]
    async fn zero_ttl_sessions_expire_immediately() {
        let svc = service(0);
        let s = svc.signup("ann@example.com", "pw").await.unwrap();
        assert_eq!(svc.authenticate(&s.token).await, None);
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let svc = service(DEFAULT_SESSION_TTL_SECS);
        assert_eq!(svc.authenticate("nope").await, None);
    }
}
