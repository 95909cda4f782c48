// handlers/protected/comments.rs - Comment endpoints
//
// GET|POST /api/go/posts/:id/comments, PUT|DELETE /api/go/comments/:id

use axum::extract::State;

use crate::database::models::{CombinedComment, Comment, CommentInput};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

fn require_content(input: &CommentInput) -> Result<&str, ApiError> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(ApiError::missing_fields(&["content"]));
    }
    Ok(content)
}

/// GET /api/go/posts/:id/comments - Oldest first; `[]` when there are none
pub async fn comments_get(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i32>,
) -> ApiResult<Vec<CombinedComment>> {
    Ok(ApiResponse::success(
        state.store.comments_for_post(post_id).await?,
    ))
}

/// POST /api/go/posts/:id/comments - Comment as the caller
pub async fn comments_post(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(post_id): ApiPath<i32>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<Comment> {
    let content = require_content(&input)?;

    if state.store.get_post(post_id).await?.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }

    let comment = state
        .store
        .insert_comment(post_id, caller.user_id, content)
        .await?;

    Ok(ApiResponse::success(comment))
}

/// PUT /api/go/comments/:id - Edit content; the timestamp is refreshed
pub async fn comment_put(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<CommentInput>,
) -> ApiResult<Comment> {
    let content = require_content(&input)?;

    let existing = state
        .store
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    caller.ensure_owner(state.enforce_ownership(), existing.user_id, "comment")?;

    let comment = state
        .store
        .update_comment(id, content)
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::success(comment))
}

/// DELETE /api/go/comments/:id - 204 whether or not the comment existed
pub async fn comment_delete(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    if let Some(existing) = state.store.get_comment(id).await? {
        caller.ensure_owner(state.enforce_ownership(), existing.user_id, "comment")?;
        state.store.delete_comment(id).await?;
    }

    Ok(ApiResponse::no_content())
}
