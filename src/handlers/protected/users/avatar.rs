use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::handlers::UploadedFile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::storage::avatar_path;

/// POST /api/go/users/avatar - Replace the caller's avatar (multipart field `avatar`)
pub async fn avatar_post(
    State(state): State<AppState>,
    caller: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("avatar") {
            upload = Some(UploadedFile::read(field).await?);
            break;
        }
    }
    let upload = upload.ok_or_else(|| ApiError::bad_request("Error retrieving file"))?;

    let bucket = &state.config.storage.avatar_bucket;
    let path = avatar_path(caller.user_id, upload.file_name.as_deref());

    // Old object may not exist yet; one saved under another extension is left behind
    if let Err(e) = state.storage.delete(bucket, &path).await {
        warn!("Failed to delete existing avatar {}: {}", path, e);
    }

    let url = state
        .storage
        .put(bucket, &path, upload.bytes, &upload.content_type)
        .await?;

    if !state.store.set_avatar(caller.user_id, &url).await? {
        return Err(ApiError::not_found("User not found"));
    }

    info!("Updated avatar for user {}", caller.user_id);
    Ok(ApiResponse::success(json!({ "avatar": url })))
}
