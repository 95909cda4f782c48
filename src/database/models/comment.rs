use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommentInput {
    pub content: String,
}

/// Comment annotated with its author's display name and avatar
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CombinedComment {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub user_avatar: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}
