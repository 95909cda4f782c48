// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, token introspection, health, and the legacy
// unauthenticated avatar patch.

pub mod auth;
pub mod health;
pub mod users;

pub use auth::*;
pub use health::health_get;
pub use users::avatar_put;
