use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::AppConfig;
use crate::database::Store;
use crate::services::CredentialStore;
use crate::storage::ObjectStorage;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Store>,
    pub storage: Arc<dyn ObjectStorage>,
    pub tokens: Arc<TokenService>,
    pub credentials: CredentialStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>, storage: Arc<dyn ObjectStorage>) -> Self {
        let tokens = Arc::new(TokenService::from_config(&config.security));
        let credentials = CredentialStore::new(
            store.clone(),
            PasswordHasher::new(config.security.bcrypt_cost),
        );

        Self {
            config: Arc::new(config),
            store,
            storage,
            tokens,
            credentials,
        }
    }

    pub fn enforce_ownership(&self) -> bool {
        self.config.security.enforce_ownership
    }
}
