// handlers/public/auth/verify.rs - POST /verify-token handler

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /verify-token - Report whether the bearer token is valid
///
/// A missing header or empty token is a 400; a token that fails
/// verification is a 401.
pub async fn verify_token_post(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Value> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::bad_request("Authorization header is required"))?
        .to_str()
        .map_err(|_| ApiError::bad_request("Invalid Authorization header format"))?;

    let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
    if token.is_empty() {
        return Err(ApiError::bad_request("Token is required"));
    }

    let claims = state.tokens.verify(token).map_err(|e| {
        warn!("Token verification failed: {}", e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(json!({
        "valid": true,
        "claims": claims,
    })))
}
