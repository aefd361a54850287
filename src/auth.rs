//! Local accounts with salted password hashes, as a gate in front of the
//! boards.

use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::io::state_io::{load_users, save_users};
use crate::io::{PersistenceError, Storage};
use crate::model::config::AppConfig;
use crate::model::user::UserRecord;
use crate::session::Session;
use crate::util::clock::Clock;
use crate::util::ids::generate_id;

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("an account already exists for {0}")]
    UserExists(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0} must not be empty")]
    Validation(&'static str),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Lowercase hex of sha256(password + salt).
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().r#gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Registration, login and logout over the user list in `S`.
pub struct Authenticator<S: Storage> {
    storage: S,
    current: Option<UserRecord>,
}

impl<S: Storage> Authenticator<S> {
    pub fn new(storage: S) -> Self {
        Authenticator {
            storage,
            current: None,
        }
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.current.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    /// Create an account and log it in.
    pub fn register(&mut self, email: &str, password: &str) -> Result<&UserRecord, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation("email"));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("password"));
        }

        let mut users = load_users(&self.storage)?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserExists(email.to_string()));
        }
        let salt = generate_salt();
        let user = UserRecord {
            id: generate_id("user"),
            email: email.to_string(),
            password_hash: hash_password(password, &salt),
            salt,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        save_users(&self.storage, &users)?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(&*self.current.insert(user))
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<&UserRecord, AuthError> {
        let email = email.trim();
        let user = load_users(&self.storage)?
            .into_iter()
            .find(|u| u.email == email)
            .filter(|u| hash_password(password, &u.salt) == u.password_hash)
            .ok_or_else(|| {
                tracing::debug!("login rejected");
                AuthError::InvalidCredentials
            })?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(&*self.current.insert(user))
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.current.take() {
            tracing::info!(user_id = %user.id, "user logged out");
        }
    }

    /// Open the boards, sharing this authenticator's storage. Only allowed
    /// while someone is logged in.
    pub fn open_session<C: Clock>(&self, clock: C, config: &AppConfig) -> Result<Session<&S, C>, AuthError> {
        if self.current.is_none() {
            return Err(AuthError::NotLoggedIn);
        }
        Ok(Session::open(&self.storage, clock, config))
    }
}
