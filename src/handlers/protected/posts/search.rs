use axum::extract::State;

use crate::database::models::{CombinedPost, PostQuery};
use crate::handlers::ApiJson;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::feed;
use crate::state::AppState;

/// POST /api/go/posts/search - Posts matching every supplied filter
///
/// Body fields (`user_id`, `latitude`, `longitude`, `date`, `activity`) are
/// all optional; `{}` returns every post. Each result carries its comments.
pub async fn search_post(
    State(state): State<AppState>,
    ApiJson(query): ApiJson<PostQuery>,
) -> ApiResult<Vec<CombinedPost>> {
    let filter = query.into_filter()?;
    let posts = feed::search(state.store.as_ref(), &filter).await?;
    Ok(ApiResponse::success(posts))
}
