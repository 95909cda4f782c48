// handlers/protected/posts/mod.rs - /api/go/posts/*

pub mod images; // POST /api/go/posts/images/upload
pub mod record; // POST /api/go/posts, GET|PUT|DELETE /api/go/posts/:id
pub mod search; // POST /api/go/posts/search

pub use images::images_post;
pub use record::{posts_post, record_delete, record_get, record_put};
pub use search::search_post;
