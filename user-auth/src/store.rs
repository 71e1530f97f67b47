//! User persistence.
//!
//! Stores only ever see normalized (trimmed, lower-cased) emails; see
//! [`crate::service::AuthService`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument};

use crate::error::AuthError;
use crate::hasher::{CredentialHasher, verify_blocking};

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

/// Persisted account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub email: String,
    /// PHC string produced by a [`CredentialHasher`].
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl StoredUser {
    pub fn user(&self) -> User {
        User {
            email: self.email.clone(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError>;

    /// Inserts a new account.
    ///
    /// # Errors
    /// [`AuthError::EmailTaken`] if the email is already registered.
    async fn create(&self, user: StoredUser) -> Result<(), AuthError>;

    /// Returns the account when `password` matches its stored hash.
    ///
    /// The hash check runs on the blocking pool.
    async fn verify_credential(
        &self,
        email: &str,
        password: &str,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Result<Option<User>, AuthError> {
        let Some(stored) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let matches = verify_blocking(hasher, password, &stored.password_hash).await?;
        Ok(matches.then(|| stored.user()))
    }
}

/* --------------------- In-memory --------------------- */

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create(&self, user: StoredUser) -> Result<(), AuthError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.insert(user.email.clone(), user);
        Ok(())
    }
}

/* --------------------- JSON file --------------------- */

/// Users kept as a JSON array on disk.
///
/// A missing file is an empty store. Every create rewrites the whole file
/// through a temporary sibling and a rename.
pub struct JsonFileUserStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileUserStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<StoredUser>, AuthError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuthError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|source| AuthError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, users: &[StoredUser]) -> Result<(), AuthError> {
        let io_err = |source| AuthError::Io {
            path: self.path.clone(),
            source,
        };
        let body = serde_json::to_vec_pretty(users).map_err(|source| AuthError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for JsonFileUserStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredUser>, AuthError> {
        let users = self.read_all().await?;
        debug!(count = users.len(), "user store read");
        Ok(users.into_iter().find(|u| u.email == email))
    }

    #[instrument(skip_all, fields(path = %self.path.display(), email = %user.email))]
    async fn create(&self, user: StoredUser) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.read_all().await?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        users.push(user);
        self.write_all(&users).await?;
        info!(count = users.len(), "user store updated");
        Ok(())
    }
}
