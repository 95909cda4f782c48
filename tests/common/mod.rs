// Shared harness for the Postgres-backed integration tests.
//
// Every test serves the real router on an ephemeral port inside its own
// runtime. Tests return early (pass) when TEST_DATABASE_URL is not set.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use divelog_api::config::AppConfig;
use divelog_api::database::{schema, DatabaseManager, PgStore};
use divelog_api::storage::{ObjectStorage, StorageError};
use divelog_api::{app, AppState};

static SCHEMA: OnceCell<()> = OnceCell::const_new();
static SEQUENCE: AtomicU32 = AtomicU32::new(0);

/// Storage stand-in; integration runs never reach a real bucket
struct UrlOnlyStorage;

#[async_trait]
impl ObjectStorage for UrlOnlyStorage {
    async fn put(&self, bucket: &str, path: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<String, StorageError> {
        Ok(format!("https://storage.test/{}/{}", bucket, path))
    }

    async fn delete(&self, _bucket: &str, _path: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

fn test_config(database_url: String) -> AppConfig {
    let mut config = AppConfig::development();
    config.database.url = database_url;
    config.database.max_connections = 4;
    config.security.jwt_secret = "integration-secret".into();
    config.security.bcrypt_cost = 4;
    config
}

pub struct TestServer {
    pub base_url: String,
    pub client: Client,
}

impl TestServer {
    /// `None` when no test database is configured
    pub async fn start() -> Result<Option<Self>> {
        let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return Ok(None);
        };
        let config = test_config(database_url);

        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to test database")?;
        SCHEMA
            .get_or_try_init(|| async { schema::ensure_schema(&pool).await })
            .await
            .context("failed to ensure schema")?;

        let state = AppState::new(config, Arc::new(PgStore::new(pool)), Arc::new(UrlOnlyStorage));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Some(Self {
            base_url: format!("http://{}", addr),
            client: Client::new(),
        }))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> Result<Response> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.get(self.url(path)).bearer_auth(token).send().await?)
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> Result<Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        Ok(self.client.delete(self.url(path)).bearer_auth(token).send().await?)
    }

    /// Sign up a fresh diver; returns `(user_id, token, email)`
    pub async fn signup(&self, first_name: &str, password: &str) -> Result<(i32, String, String)> {
        let email = unique_email(first_name);
        let res = self
            .post(
                "/sign-up",
                None,
                &json!({
                    "first_name": first_name,
                    "last_name": "Tester",
                    "email": email,
                    "password": password,
                    "age": 30,
                }),
            )
            .await?;
        anyhow::ensure!(res.status().is_success(), "signup failed: {}", res.status());

        let body: Value = res.json().await?;
        let id = body["userId"]
            .as_str()
            .context("userId missing")?
            .parse()
            .context("userId not numeric")?;
        let token = body["token"].as_str().context("token missing")?.to_string();
        Ok((id, token, email))
    }
}

/// Emails are unique per run so tests never collide on the shared database
pub fn unique_email(prefix: &str) -> String {
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let n = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{}.{}.{}@it.divelog.test", prefix.to_lowercase(), nanos, n)
}

pub fn dive(title: &str) -> Value {
    json!({
        "title": title,
        "date": "2024-06-01",
        "latitude": 17.3158,
        "longitude": -87.5348,
        "depth": 40.0,
        "visibility": 30.0,
        "activity": "scuba",
        "description": "Wall dive",
        "rating": 4.5,
    })
}
