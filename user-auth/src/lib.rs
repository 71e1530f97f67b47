//! Email/password accounts with bearer sessions.
//!
//! Persistence ([`store::UserStore`]) and hashing ([`hasher::CredentialHasher`])
//! are injected into [`service::AuthService`]; passwords are never compared in
//! plain text.

pub mod error;
pub mod hasher;
pub mod service;
pub mod store;

pub use error::AuthError;
pub use hasher::{Argon2Hasher, CredentialHasher};
pub use service::{AuthService, DEFAULT_SESSION_TTL_SECS, Session};
pub use store::{InMemoryUserStore, JsonFileUserStore, StoredUser, User, UserStore};
