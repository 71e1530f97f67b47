//! Password hashing capability.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) so parameters travel with
//! the hash and can change without invalidating stored users.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, Version};
use tokio::task;
use uuid::Uuid;

use crate::error::AuthError;

pub trait CredentialHasher: Send + Sync {
    /// Produces a salted PHC hash of `password`.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Checks `password` against a stored PHC hash. Unparseable hashes never verify.
    fn verify(&self, password: &str, phc: &str) -> bool;
}

/// Runs [`CredentialHasher::hash`] on the blocking pool.
///
/// # Errors
/// Hasher failures, or [`AuthError::Hashing`] if the blocking task dies.
pub async fn hash_blocking(
    hasher: Arc<dyn CredentialHasher>,
    password: &str,
) -> Result<String, AuthError> {
    let password = password.to_owned();
    task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| AuthError::Hashing(format!("hash task failed: {e}")))?
}

/// Runs [`CredentialHasher::verify`] on the blocking pool.
///
/// # Errors
/// [`AuthError::Hashing`] if the blocking task dies.
pub async fn verify_blocking(
    hasher: Arc<dyn CredentialHasher>,
    password: &str,
    phc: &str,
) -> Result<bool, AuthError> {
    let (password, phc) = (password.to_owned(), phc.to_owned());
    task::spawn_blocking(move || hasher.verify(&password, &phc))
        .await
        .map_err(|e| AuthError::Hashing(format!("verify task failed: {e}")))
}

/// Argon2id with OWASP parameters (19 MiB, 2 iterations, 1 lane).
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Custom cost parameters; memory in KiB.
    ///
    /// # Errors
    /// [`AuthError::Hashing`] if Argon2 rejects the parameters.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, phc: &str) -> bool {
        match PasswordHash::new(phc) {
            Ok(parsed) => self
                .argon2()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn hash_is_phc_and_verifies() {
        let h = cheap();
        let phc = h.hash("s3cret").unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(!phc.contains("s3cret"));
        assert!(h.verify("s3cret", &phc));
        assert!(!h.verify("S3cret", &phc));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let h = cheap();
        assert_ne!(h.hash("pw").unwrap(), h.hash("pw").unwrap());
    }

    #[test]
    fn garbage_hash_never_verifies() {
        assert!(!cheap().verify("pw", "pw"));
        assert!(!cheap().verify("pw", ""));
    }

    #[test]
    fn invalid_params_are_rejected() {
        assert!(matches!(
            Argon2Hasher::with_params(1, 0, 0),
            Err(AuthError::Hashing(_))
        ));
    }
}
