use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::handlers::ApiQuery;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub search: String,
}

/// GET /api/go/users/search?search=term - Name search, case-insensitive
pub async fn search_get(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> ApiResult<Value> {
    let users = state
        .store
        .search_users(params.search.trim(), state.config.api.user_search_limit)
        .await?;

    Ok(ApiResponse::success(json!({ "users": users })))
}
