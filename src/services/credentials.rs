use std::sync::Arc;

use thiserror::Error;
use tokio::task;

use crate::auth::PasswordHasher;
use crate::database::models::{NewUser, User, UserWithDigest};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// User records plus their password digests. Plaintext passwords enter here
/// and only digests leave for the store.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn Store>,
    hasher: PasswordHasher,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn Store>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserWithDigest>, CredentialError> {
        Ok(self.store.find_user_by_email(email).await?)
    }

    /// Hash on a blocking thread, then persist. Returns the new id.
    pub async fn insert(&self, user: &NewUser) -> Result<i32, CredentialError> {
        let hasher = self.hasher;
        let plaintext = user.password.clone();
        let digest = task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(self.store.insert_user(user, &digest).await?)
    }

    /// Profile columns only; the digest is never rewritten here
    pub async fn update(&self, user: &User) -> Result<Option<User>, CredentialError> {
        Ok(self.store.update_user(user).await?)
    }

    /// The user when `password` matches the stored digest; `None` for an
    /// unknown email or a mismatch alike.
    pub async fn verify(&self, email: &str, password: &str) -> Result<Option<User>, CredentialError> {
        let Some(record) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        let hasher = self.hasher;
        let plaintext = password.to_string();
        let digest = record.password_hash;
        let matches = task::spawn_blocking(move || hasher.verify(&digest, &plaintext))
            .await
            .map_err(|e| CredentialError::Hash(e.to_string()))?;

        Ok(matches.then_some(record.user))
    }
}
