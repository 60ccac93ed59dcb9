// handlers/public/auth/mod.rs - Token acquisition and registration

use serde::Deserialize;

pub mod login; // POST /auth/login
pub mod register; // POST /auth/register

pub use login::login_post;
pub use register::register_post;

/// Body shared by login and register. Fields are optional so that a missing
/// one is reported as 400 with a readable message.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}
