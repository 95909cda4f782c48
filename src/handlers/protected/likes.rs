// handlers/protected/likes.rs - GET|POST|DELETE /api/go/posts/:id/likes

use axum::extract::State;

use crate::database::models::Like;
use crate::handlers::ApiPath;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/go/posts/:id/likes
pub async fn likes_get(
    State(state): State<AppState>,
    ApiPath(post_id): ApiPath<i32>,
) -> ApiResult<Vec<Like>> {
    Ok(ApiResponse::success(state.store.likes_for_post(post_id).await?))
}

/// POST /api/go/posts/:id/likes - Like as the caller
///
/// No pre-check: a second like of the same post fails on the store's
/// uniqueness constraint.
pub async fn likes_post(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(post_id): ApiPath<i32>,
) -> ApiResult<Like> {
    let like = state.store.insert_like(post_id, caller.user_id).await?;
    Ok(ApiResponse::created(like))
}

/// DELETE /api/go/posts/:id/likes - Unlike; a no-op when never liked
pub async fn likes_delete(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(post_id): ApiPath<i32>,
) -> ApiResult<()> {
    state.store.delete_like(post_id, caller.user_id).await?;
    Ok(ApiResponse::no_content())
}
