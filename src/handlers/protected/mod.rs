// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`, which inserts the
// `AuthUser` extension.

pub mod auth;
pub mod measurements;
pub mod series;
