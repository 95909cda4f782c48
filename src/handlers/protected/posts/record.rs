use axum::extract::State;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::{CombinedPost, Post, PostInput};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::feed;
use crate::state::AppState;

/// POST /api/go/posts - Log a dive, returning `{id}`
///
/// With ownership enforced the caller becomes the owner and any `user_id` in
/// the body is ignored.
pub async fn posts_post(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<Value> {
    let owner = state.enforce_ownership().then_some(caller.user_id);
    let post = input.into_new_post(owner, Utc::now())?;

    let id = state.store.insert_post(&post).await?;
    info!("Created post {} for user {}", id, post.user_id);

    Ok(ApiResponse::success(json!({ "id": id })))
}

/// GET /api/go/posts/:id - One post with author, like count and comments
pub async fn record_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<CombinedPost> {
    let post = feed::get(state.store.as_ref(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(ApiResponse::success(post))
}

/// PUT /api/go/posts/:id - Overwrite a post, like count included
///
/// Images are left alone; an omitted `timestamp` keeps the stored one.
pub async fn record_put(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<PostInput>,
) -> ApiResult<Post> {
    let existing = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let enforce = state.enforce_ownership();
    caller.ensure_owner(enforce, existing.user_id, "post")?;

    let owner = if enforce {
        Some(existing.user_id)
    } else {
        input.user_id.or(Some(existing.user_id))
    };
    let update = input.into_update(owner)?;

    let post = state
        .store
        .update_post(id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    Ok(ApiResponse::success(post))
}

/// DELETE /api/go/posts/:id - 204 whether or not the post existed
pub async fn record_delete(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<()> {
    if let Some(existing) = state.store.get_post(id).await? {
        caller.ensure_owner(state.enforce_ownership(), existing.user_id, "post")?;
        state.store.delete_post(id).await?;
        info!("Deleted post {}", id);
    }

    Ok(ApiResponse::no_content())
}
