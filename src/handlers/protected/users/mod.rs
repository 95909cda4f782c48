// handlers/protected/users/mod.rs - /api/go/users/*

pub mod avatar; // POST /api/go/users/avatar
pub mod record; // GET|POST /api/go/users, GET|PUT|DELETE /api/go/users/:id
pub mod search; // GET /api/go/users/search

pub use avatar::avatar_post;
pub use record::{record_delete, record_get, record_put, users_get, users_post};
pub use search::search_get;
