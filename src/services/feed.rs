// Read-time projection of posts with their authors, like counts and comments.
// Nothing here is persisted; every call rebuilds the view from the store.

use crate::database::models::{CombinedPost, PostFilter, PostView};
use crate::database::{DatabaseError, Store};

async fn attach_comments(store: &dyn Store, post: PostView) -> Result<CombinedPost, DatabaseError> {
    let comments = store.comments_for_post(post.id).await?;
    Ok(CombinedPost { post, comments })
}

/// Every post matching `filter`, newest first
pub async fn search(store: &dyn Store, filter: &PostFilter) -> Result<Vec<CombinedPost>, DatabaseError> {
    let posts = store.search_posts(filter).await?;

    let mut combined = Vec::with_capacity(posts.len());
    for post in posts {
        combined.push(attach_comments(store, post).await?);
    }
    Ok(combined)
}

pub async fn get(store: &dyn Store, id: i32) -> Result<Option<CombinedPost>, DatabaseError> {
    match store.get_post_view(id).await? {
        Some(post) => Ok(Some(attach_comments(store, post).await?)),
        None => Ok(None),
    }
}
