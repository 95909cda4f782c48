pub mod credentials;
pub mod feed;

pub use credentials::{CredentialError, CredentialStore};
