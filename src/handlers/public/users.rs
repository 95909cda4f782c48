// handlers/public/users.rs - PUT /users/:id handler
//
// Unauthenticated avatar patch kept for older clients. It sits beside the
// authenticated upload route and is only mounted while
// `api.enable_legacy_avatar_patch` is on.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AvatarPatch {
    pub avatar: String,
}

/// PUT /users/:id - Set a user's avatar URL without authentication
pub async fn avatar_put(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(patch): ApiJson<AvatarPatch>,
) -> ApiResult<Value> {
    warn!("Unauthenticated avatar patch for user {}", id);

    if !state.store.set_avatar(id, &patch.avatar).await? {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::success(json!({ "message": "Avatar updated" })))
}
