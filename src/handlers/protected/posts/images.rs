use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use serde_json::{json, Value};
use tracing::info;

use crate::error::ApiError;
use crate::handlers::UploadedFile;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;
use crate::storage::post_image_path;

/// POST /api/go/posts/images/upload - Attach images to a post
///
/// Multipart form: a `post_id` text field plus one or more `images` (or
/// `images[]`) file fields. The uploaded set replaces the post's image list.
pub async fn images_post(
    State(state): State<AppState>,
    caller: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Value> {
    let mut multipart = multipart?;

    let mut post_id = None;
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("post_id") => post_id = Some(field.text().await?),
            Some("images") | Some("images[]") => files.push(UploadedFile::read(field).await?),
            _ => {}
        }
    }

    let post_id: i32 = match post_id.as_deref().map(str::trim) {
        None | Some("") => return Err(ApiError::bad_request("Missing post_id")),
        Some(raw) => raw
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid post_id"))?,
    };
    if files.is_empty() {
        return Err(ApiError::bad_request("No images provided"));
    }

    let post = state
        .store
        .get_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    caller.ensure_owner(state.enforce_ownership(), post.user_id, "post")?;

    let bucket = &state.config.storage.post_bucket;
    let mut urls = Vec::with_capacity(files.len());
    for (index, file) in files.into_iter().enumerate() {
        let path = post_image_path(caller.user_id, post_id, index, file.file_name.as_deref());
        let url = state
            .storage
            .put(bucket, &path, file.bytes, &file.content_type)
            .await?;
        urls.push(url);
    }

    if !state.store.set_post_images(post_id, &urls).await? {
        return Err(ApiError::not_found("Post not found"));
    }

    info!("Uploaded {} images for post {}", urls.len(), post_id);
    Ok(ApiResponse::success(json!({
        "message": "Images uploaded successfully",
        "images": urls,
    })))
}
