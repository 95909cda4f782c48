// handlers/mod.rs - Two handler tiers
//
// Public (no auth) → Protected (bearer token required, mounted under /api/go)
pub mod extract;
pub mod protected;
pub mod public;

pub use extract::{ApiJson, ApiPath, ApiQuery, UploadedFile};
