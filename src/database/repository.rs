use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    CombinedComment, Comment, Like, NewPost, NewUser, Post, PostFilter, PostUpdate, PostView,
    User, UserSummary, UserWithDigest,
};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a user with an already-hashed password, returning the new id
    async fn insert_user(&self, user: &NewUser, password_hash: &str) -> Result<i32, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserWithDigest>, DatabaseError>;

    async fn get_user(&self, id: i32) -> Result<Option<User>, DatabaseError>;

    async fn list_users(&self) -> Result<Vec<User>, DatabaseError>;

    /// Case-insensitive substring match on first or last name
    async fn search_users(&self, term: &str, limit: i64) -> Result<Vec<UserSummary>, DatabaseError>;

    /// Overwrite profile columns of `user.id`. Never touches the digest.
    async fn update_user(&self, user: &User) -> Result<Option<User>, DatabaseError>;

    /// Returns false when no such user exists
    async fn set_avatar(&self, id: i32, avatar: &str) -> Result<bool, DatabaseError>;

    async fn delete_user(&self, id: i32) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, post: &NewPost) -> Result<i32, DatabaseError>;

    async fn get_post(&self, id: i32) -> Result<Option<Post>, DatabaseError>;

    async fn update_post(&self, id: i32, update: &PostUpdate) -> Result<Option<Post>, DatabaseError>;

    async fn delete_post(&self, id: i32) -> Result<bool, DatabaseError>;

    async fn set_post_images(&self, id: i32, images: &[String]) -> Result<bool, DatabaseError>;

    /// Posts joined with author name/avatar and a live like count
    async fn search_posts(&self, filter: &PostFilter) -> Result<Vec<PostView>, DatabaseError>;

    async fn get_post_view(&self, id: i32) -> Result<Option<PostView>, DatabaseError>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn insert_comment(&self, post_id: i32, user_id: i32, content: &str) -> Result<Comment, DatabaseError>;

    async fn get_comment(&self, id: i32) -> Result<Option<Comment>, DatabaseError>;

    /// Replace content and refresh the timestamp
    async fn update_comment(&self, id: i32, content: &str) -> Result<Option<Comment>, DatabaseError>;

    async fn delete_comment(&self, id: i32) -> Result<bool, DatabaseError>;

    /// Oldest first, each with its author's name and avatar
    async fn comments_for_post(&self, post_id: i32) -> Result<Vec<CombinedComment>, DatabaseError>;
}

#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Fails with a constraint error when the pair already exists
    async fn insert_like(&self, post_id: i32, user_id: i32) -> Result<Like, DatabaseError>;

    async fn likes_for_post(&self, post_id: i32) -> Result<Vec<Like>, DatabaseError>;

    async fn delete_like(&self, post_id: i32, user_id: i32) -> Result<bool, DatabaseError>;
}

/// Everything the HTTP layer needs from the relational store
#[async_trait]
pub trait Store: UserStore + PostStore + CommentStore + LikeStore {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
