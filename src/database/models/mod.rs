pub mod comment;
pub mod like;
pub mod post;
pub mod user;

pub use comment::{CombinedComment, Comment, CommentInput};
pub use like::Like;
pub use post::{
    CombinedPost, NewPost, Post, PostFilter, PostInput, PostQuery, PostUpdate, PostView,
};
pub use user::{NewUser, User, UserSummary, UserUpdate, UserWithDigest};

use thiserror::Error;

/// Request payloads that decoded but cannot be persisted as given
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate(String),
}

/// Strict `YYYY-MM-DD` calendar date
pub fn parse_date(raw: &str) -> Result<chrono::NaiveDate, InputError> {
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| InputError::InvalidDate(raw.to_string()))
}
