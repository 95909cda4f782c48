// handlers/public/auth/signup.rs - POST /sign-up handler

use axum::extract::State;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::database::models::NewUser;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /sign-up - Create an account and return `{token, userId}`
///
/// The insert and the follow-up lookup by email are one logical step: if the
/// row cannot be read back the caller gets 401, not 500.
pub async fn signup_post(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<Value> {
    input.validate()?;

    state.credentials.insert(&input).await?;

    let Some(record) = state.credentials.find_by_email(&input.email).await? else {
        warn!("New account could not be read back after insert");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };
    let user = record.user;

    let token = state.tokens.issue(user.id, &user.email)?;
    info!("Issued token for new user {}", user.id);

    Ok(ApiResponse::success(json!({
        "token": token,
        "userId": user.id.to_string(),
    })))
}
