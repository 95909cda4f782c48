// handlers/protected/mod.rs - Handlers behind the bearer-token gate
//
// Every route here is mounted under /api/go with `require_auth` applied, so
// handlers can take `AuthUser` as an extractor.

pub mod comments;
pub mod likes;
pub mod posts;
pub mod users;
