use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use crate::database::models::{NewUser, User, UserUpdate};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/go/users - Every user profile
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<User>> {
    Ok(ApiResponse::success(state.store.list_users().await?))
}

/// POST /api/go/users - Create a user on someone's behalf
pub async fn users_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<User> {
    input.validate()?;

    let id = state.credentials.insert(&input).await?;
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!("Created user {}", user.id);
    Ok(ApiResponse::success(user))
}

/// GET /api/go/users/:id
pub async fn record_get(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<User> {
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user))
}

/// PUT /api/go/users/:id - Update profile fields present in the body
pub async fn record_put(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<User> {
    caller.ensure_owner(state.enforce_ownership(), id, "user")?;

    let mut user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    update.apply_to(&mut user);

    let updated = state
        .credentials
        .update(&user)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(updated))
}

/// DELETE /api/go/users/:id - Removes the user and everything they own
pub async fn record_delete(
    State(state): State<AppState>,
    caller: AuthUser,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Value> {
    caller.ensure_owner(state.enforce_ownership(), id, "user")?;

    if !state.store.delete_user(id).await? {
        return Err(ApiError::not_found("User not found"));
    }

    info!("Deleted user {}", id);
    Ok(ApiResponse::success(json!({ "message": "User deleted" })))
}
