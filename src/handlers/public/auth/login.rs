// handlers/public/auth/login.rs - POST /login handler

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /login - Exchange email and password for a token
///
/// Unknown email and wrong password both answer 401 with the same message,
/// so the response never confirms that an account exists.
pub async fn login_post(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Value> {
    let Some(user) = state
        .credentials
        .verify(&request.email, &request.password)
        .await?
    else {
        warn!("Failed login attempt");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    let token = state.tokens.issue(user.id, &user.email)?;
    info!("Issued token for user {}", user.id);

    Ok(ApiResponse::success(json!({ "token": token })))
}
