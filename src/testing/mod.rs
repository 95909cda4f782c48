// In-memory doubles for the relational store and object storage, plus a
// router harness driven through `tower::ServiceExt::oneshot`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;

use crate::config::AppConfig;
use crate::database::models::{
    CombinedComment, Comment, Like, NewPost, NewUser, Post, PostFilter, PostUpdate, PostView,
    User, UserSummary, UserWithDigest,
};
use crate::database::{CommentStore, DatabaseError, LikeStore, PostStore, Store, UserStore};
use crate::state::AppState;
use crate::storage::{ObjectStorage, StorageError};

#[derive(Default)]
struct Tables {
    users: Vec<UserWithDigest>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    next_id: HashMap<&'static str, i32>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i32 {
        let id = self.next_id.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn user(&self, id: i32) -> Option<&User> {
        self.users.iter().map(|u| &u.user).find(|u| u.id == id)
    }

    fn user_name(&self, id: i32) -> (String, Option<String>) {
        self.user(id)
            .map(|u| (format!("{} {}", u.first_name, u.last_name), u.avatar.clone()))
            .unwrap_or_default()
    }

    fn check_user(&self, user: &User) -> Result<(), DatabaseError> {
        if user.age < 0 {
            return Err(constraint("users_age_check"));
        }
        if self
            .users
            .iter()
            .any(|u| u.user.id != user.id && u.user.email == user.email)
        {
            return Err(constraint("users_email_key"));
        }
        Ok(())
    }

    fn check_post(&self, post: &Post) -> Result<(), DatabaseError> {
        if self.user(post.user_id).is_none() {
            return Err(constraint("posts_user_id_fkey"));
        }
        if post.depth < 0.0 {
            return Err(constraint("posts_depth_check"));
        }
        if post.visibility < 0.0 {
            return Err(constraint("posts_visibility_check"));
        }
        if post.rating.is_some_and(|r| !(0.0..=5.0).contains(&r)) {
            return Err(constraint("posts_rating_check"));
        }
        Ok(())
    }

    fn check_refs(&self, table: &str, post_id: i32, user_id: i32) -> Result<(), DatabaseError> {
        if !self.posts.iter().any(|p| p.id == post_id) {
            return Err(DatabaseError::Constraint(format!("{}_post_id_fkey", table)));
        }
        if self.user(user_id).is_none() {
            return Err(DatabaseError::Constraint(format!("{}_user_id_fkey", table)));
        }
        Ok(())
    }

    fn view(&self, post: &Post) -> PostView {
        let (user_name, user_avatar) = self.user_name(post.user_id);
        PostView {
            id: post.id,
            user_id: post.user_id,
            user_name,
            user_avatar,
            title: post.title.clone(),
            date: post.date,
            latitude: post.latitude,
            longitude: post.longitude,
            depth: post.depth,
            visibility: post.visibility,
            activity: post.activity.clone(),
            description: post.description.clone(),
            images: post.images.clone(),
            timestamp: post.timestamp,
            rating: post.rating,
            likes: self.likes.iter().filter(|l| l.post_id == post.id).count() as i64,
        }
    }

    fn remove_post(&mut self, id: i32) -> bool {
        let before = self.posts.len();
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
        self.likes.retain(|l| l.post_id != id);
        self.posts.len() != before
    }
}

fn constraint(name: &str) -> DatabaseError {
    DatabaseError::Constraint(name.to_string())
}

/// Store double that enforces the same keys, checks and cascades as the
/// Postgres schema
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: Mutex<bool>,
    emails_hidden: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ping` fail as an unreachable database would
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut flag) = self.offline.lock() {
            *flag = offline;
        }
    }

    /// Make `find_user_by_email` miss every row while inserts still land
    pub fn hide_emails(&self, hidden: bool) {
        if let Ok(mut flag) = self.emails_hidden.lock() {
            *flag = hidden;
        }
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DatabaseError> {
        self.tables
            .lock()
            .map_err(|_| DatabaseError::QueryError("memory store poisoned".into()))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> Result<i32, DatabaseError> {
        let mut tables = self.tables()?;
        let mut record = User {
            id: 0,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            latitude: user.latitude,
            longitude: user.longitude,
            age: user.age,
            bio: user.bio.clone(),
            avatar: user.avatar.clone(),
        };
        tables.check_user(&record)?;

        record.id = tables.next_id("users");
        let id = record.id;
        tables.users.push(UserWithDigest {
            user: record,
            password_hash: password_hash.to_string(),
        });
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithDigest>, DatabaseError> {
        if matches!(self.emails_hidden.lock().map(|flag| *flag), Ok(true)) {
            return Ok(None);
        }
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn get_user(&self, id: i32) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables()?.user(id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        Ok(self.tables()?.users.iter().map(|u| u.user.clone()).collect())
    }

    async fn search_users(&self, term: &str, limit: i64) -> Result<Vec<UserSummary>, DatabaseError> {
        let needle = term.to_lowercase();
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .map(|u| &u.user)
            .filter(|u| {
                u.first_name.to_lowercase().contains(&needle)
                    || u.last_name.to_lowercase().contains(&needle)
            })
            .take(limit.max(0) as usize)
            .map(|u| UserSummary {
                id: u.id,
                first_name: u.first_name.clone(),
                last_name: u.last_name.clone(),
                email: u.email.clone(),
                avatar: u.avatar.clone(),
            })
            .collect())
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, DatabaseError> {
        let mut tables = self.tables()?;
        if tables.user(user.id).is_none() {
            return Ok(None);
        }
        tables.check_user(user)?;

        let record = tables.users.iter_mut().find(|u| u.user.id == user.id);
        Ok(record.map(|r| {
            r.user = user.clone();
            r.user.clone()
        }))
    }

    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<bool, DatabaseError> {
        let mut tables = self.tables()?;
        match tables.users.iter_mut().find(|u| u.user.id == id) {
            Some(record) => {
                record.user.avatar = Some(avatar.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables()?;
        let before = tables.users.len();
        tables.users.retain(|u| u.user.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<i32> = tables
            .posts
            .iter()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|c| c.user_id != id);
        tables.likes.retain(|l| l.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: &NewPost) -> Result<i32, DatabaseError> {
        let mut tables = self.tables()?;
        let mut record = Post {
            id: 0,
            user_id: post.user_id,
            title: post.title.clone(),
            date: post.date,
            latitude: post.latitude,
            longitude: post.longitude,
            depth: post.depth,
            visibility: post.visibility,
            activity: post.activity.clone(),
            description: post.description.clone(),
            images: Vec::new(),
            timestamp: post.timestamp,
            rating: post.rating,
            likes: 0,
        };
        tables.check_post(&record)?;

        record.id = tables.next_id("posts");
        let id = record.id;
        tables.posts.push(record);
        Ok(id)
    }

    async fn get_post(&self, id: i32) -> Result<Option<Post>, DatabaseError> {
        Ok(self.tables()?.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn update_post(&self, id: i32, update: &PostUpdate) -> Result<Option<Post>, DatabaseError> {
        let mut tables = self.tables()?;
        let Some(existing) = tables.posts.iter().find(|p| p.id == id).cloned() else {
            return Ok(None);
        };

        let updated = Post {
            id,
            user_id: update.user_id,
            title: update.title.clone(),
            date: update.date,
            latitude: update.latitude,
            longitude: update.longitude,
            depth: update.depth,
            visibility: update.visibility,
            activity: update.activity.clone(),
            description: update.description.clone(),
            images: existing.images,
            timestamp: update.timestamp.unwrap_or(existing.timestamp),
            rating: update.rating,
            likes: update.likes,
        };
        tables.check_post(&updated)?;

        let slot = tables.posts.iter_mut().find(|p| p.id == id);
        Ok(slot.map(|p| {
            *p = updated;
            p.clone()
        }))
    }

    async fn delete_post(&self, id: i32) -> Result<bool, DatabaseError> {
        Ok(self.tables()?.remove_post(id))
    }

    async fn set_post_images(&self, id: i32, images: &[String]) -> Result<bool, DatabaseError> {
        let mut tables = self.tables()?;
        match tables.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.images = images.to_vec();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn search_posts(&self, filter: &PostFilter) -> Result<Vec<PostView>, DatabaseError> {
        let tables = self.tables()?;
        let mut views: Vec<PostView> = tables
            .posts
            .iter()
            .map(|p| tables.view(p))
            .filter(|v| filter.matches(v))
            .collect();
        views.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(views)
    }

    async fn get_post_view(&self, id: i32) -> Result<Option<PostView>, DatabaseError> {
        let tables = self.tables()?;
        Ok(tables.posts.iter().find(|p| p.id == id).map(|p| tables.view(p)))
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert_comment(&self, post_id: i32, user_id: i32, content: &str) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables()?;
        tables.check_refs("comments", post_id, user_id)?;

        let comment = Comment {
            id: tables.next_id("comments"),
            post_id,
            user_id,
            content: content.to_string(),
            timestamp: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, DatabaseError> {
        Ok(self.tables()?.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn update_comment(&self, id: i32, content: &str) -> Result<Option<Comment>, DatabaseError> {
        let mut tables = self.tables()?;
        Ok(tables.comments.iter_mut().find(|c| c.id == id).map(|c| {
            c.content = content.to_string();
            c.timestamp = Utc::now();
            c.clone()
        }))
    }

    async fn delete_comment(&self, id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables()?;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() != before)
    }

    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<CombinedComment>, DatabaseError> {
        let tables = self.tables()?;
        let mut comments: Vec<CombinedComment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| {
                let (user_name, user_avatar) = tables.user_name(c.user_id);
                CombinedComment {
                    id: c.id,
                    post_id: c.post_id,
                    user_id: c.user_id,
                    user_name,
                    user_avatar,
                    content: c.content.clone(),
                    timestamp: c.timestamp,
                }
            })
            .collect();
        comments.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        Ok(comments)
    }
}

#[async_trait]
impl LikeStore for MemoryStore {
    async fn insert_like(&self, post_id: i32, user_id: i32) -> Result<Like, DatabaseError> {
        let mut tables = self.tables()?;
        tables.check_refs("likes", post_id, user_id)?;
        if tables
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Err(constraint("likes_post_id_user_id_key"));
        }

        let like = Like {
            id: tables.next_id("likes"),
            post_id,
            user_id,
        };
        tables.likes.push(like.clone());
        Ok(like)
    }

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>, DatabaseError> {
        let tables = self.tables()?;
        Ok(tables
            .likes
            .iter()
            .filter(|l| l.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn delete_like(&self, post_id: i32, user_id: i32) -> Result<bool, DatabaseError> {
        let mut tables = self.tables()?;
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(tables.likes.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        match self.offline.lock().map(|flag| *flag) {
            Ok(false) => Ok(()),
            _ => Err(DatabaseError::ConnectionError("database offline".into())),
        }
    }
}

/// A user named `first last` with a placeholder digest
pub async fn seed_user(store: &MemoryStore, first: &str, last: &str) -> i32 {
    let user = NewUser {
        first_name: first.into(),
        last_name: last.into(),
        email: format!("{}.{}@example.com", first, last).to_lowercase(),
        age: 30,
        ..Default::default()
    };
    store.insert_user(&user, "$2b$04$placeholder").await.unwrap()
}

pub async fn seed_post(store: &MemoryStore, user_id: i32) -> i32 {
    let post = NewPost {
        user_id,
        title: "Blue Hole".into(),
        date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        latitude: 17.3158,
        longitude: -87.5348,
        depth: 40.0,
        visibility: 30.0,
        activity: "scuba".into(),
        description: "Stalactites at 40m".into(),
        timestamp: Utc::now(),
        rating: Some(4.5),
    };
    store.insert_post(&post).await.unwrap()
}

/// Object storage double that records every call
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    deletes: Mutex<Vec<String>>,
    fail_deletes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delete fails, as when the object was never there
    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{}/{}", bucket, path))
            .cloned()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        let key = format!("{}/{}", bucket, path);
        self.objects.lock().unwrap().insert(key.clone(), bytes);
        Ok(format!("https://storage.test/{}", key))
    }

    async fn delete(&self, bucket: &str, path: &str) -> Result<(), StorageError> {
        let key = format!("{}/{}", bucket, path);
        self.deletes.lock().unwrap().push(key.clone());
        if self.fail_deletes {
            return Err(StorageError::Rejected {
                path: key,
                status: 404,
                body: "Object not found".into(),
            });
        }
        self.objects.lock().unwrap().remove(&key);
        Ok(())
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.database.url = "postgres://unused".into();
    config.security.jwt_secret = "test-secret".into();
    config.security.bcrypt_cost = 4;
    config
}

/// Full router over in-memory doubles
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(test_config(), MemoryStorage::new())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::with(config, MemoryStorage::new())
    }

    pub fn with(config: AppConfig, storage: MemoryStorage) -> Self {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(storage);
        let state = AppState::new(config, store.clone(), storage.clone());
        Self {
            router: crate::app::app(state.clone()),
            state,
            store,
            storage,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Sign up and return `(user_id, token)`
    pub async fn signup(&self, first: &str, email: &str, password: &str) -> (i32, String) {
        let body = serde_json::json!({
            "first_name": first,
            "last_name": "Diver",
            "email": email,
            "password": password,
            "age": 30,
        });
        let response = self
            .call(Method::POST, "/sign-up", None, Some(body))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);

        let id = response.body["userId"].as_str().unwrap().parse().unwrap();
        let token = response.body["token"].as_str().unwrap().to_string();
        (id, token)
    }

    pub async fn multipart(&self, uri: &str, token: &str, form: Multipart) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", Multipart::BOUNDARY),
            )
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(request).await
    }
}

/// Hand-built `multipart/form-data` body
#[derive(Default)]
pub struct Multipart {
    body: Vec<u8>,
}

impl Multipart {
    const BOUNDARY: &'static str = "divelog-test-boundary";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                Self::BOUNDARY,
                name,
                value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                Self::BOUNDARY,
                name,
                file_name,
                content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", Self::BOUNDARY).as_bytes());
        self.body
    }
}
