// handlers/public/auth/mod.rs - Token acquisition endpoints

pub mod login; // POST /login - authenticate and get a token
pub mod signup; // POST /sign-up - create an account and get a token
pub mod verify; // POST /verify-token - report the claims of a token

pub use login::login_post;
pub use signup::signup_post;
pub use verify::verify_token_post;
