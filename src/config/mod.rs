use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Drop and recreate every relation at startup
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_upload_bytes: usize,
    pub max_avatar_bytes: usize,
    pub user_search_limit: i64,
    /// Mount the unauthenticated `PUT /users/{id}` avatar patch
    pub enable_legacy_avatar_patch: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    /// Require the caller to own users/posts/comments they modify
    pub enforce_ownership: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub url: String,
    #[serde(skip_serializing)]
    pub service_key: String,
    pub avatar_bucket: String,
    pub post_bucket: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set")]
    MissingJwtSecret,
    #[error("DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("bcrypt cost {0} is outside 4..=31")]
    InvalidBcryptCost(u32),
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the process
    /// environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Some(v) = lookup("DATABASE_RESET_ON_START") {
            self.database.reset_on_start = v.parse().unwrap_or(self.database.reset_on_start);
        }

        // API overrides
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Some(v) = lookup("API_MAX_UPLOAD_BYTES") {
            self.api.max_upload_bytes = v.parse().unwrap_or(self.api.max_upload_bytes);
        }
        if let Some(v) = lookup("API_MAX_AVATAR_BYTES") {
            self.api.max_avatar_bytes = v.parse().unwrap_or(self.api.max_avatar_bytes);
        }
        if let Some(v) = lookup("API_ENABLE_LEGACY_AVATAR_PATCH") {
            self.api.enable_legacy_avatar_patch = v.parse().unwrap_or(self.api.enable_legacy_avatar_patch);
        }

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Some(v) = lookup("SECURITY_ENFORCE_OWNERSHIP") {
            self.security.enforce_ownership = v.parse().unwrap_or(self.security.enforce_ownership);
        }

        // Storage overrides
        if let Some(v) = lookup("SUPABASE_URL") {
            self.storage.url = v;
        }
        if let Some(v) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.storage.service_key = v;
        }
        if let Some(v) = lookup("STORAGE_AVATAR_BUCKET") {
            self.storage.avatar_bucket = v;
        }
        if let Some(v) = lookup("STORAGE_POST_BUCKET") {
            self.storage.post_bucket = v;
        }

        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::InvalidBcryptCost(self.security.bcrypt_cost));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                reset_on_start: false,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 20 * 1024 * 1024, // 20MB
                max_avatar_bytes: 10 * 1024 * 1024, // 10MB
                user_search_limit: 10,
                enable_legacy_avatar_patch: true,
            },
            security: SecurityConfig {
                jwt_secret: "divelog-development-secret".to_string(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enforce_ownership: true,
            },
            storage: StorageConfig::default_buckets(),
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                reset_on_start: false,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_upload_bytes: 20 * 1024 * 1024,
                max_avatar_bytes: 10 * 1024 * 1024,
                user_search_limit: 10,
                enable_legacy_avatar_patch: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enforce_ownership: true,
            },
            storage: StorageConfig::default_buckets(),
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                reset_on_start: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_upload_bytes: 20 * 1024 * 1024,
                max_avatar_bytes: 10 * 1024 * 1024,
                user_search_limit: 10,
                enable_legacy_avatar_patch: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enforce_ownership: true,
            },
            storage: StorageConfig::default_buckets(),
        }
    }
}

impl StorageConfig {
    fn default_buckets() -> Self {
        Self {
            url: String::new(),
            service_key: String::new(),
            avatar_bucket: "avatars".to_string(),
            post_bucket: "feedposts".to_string(),
        }
    }
}
