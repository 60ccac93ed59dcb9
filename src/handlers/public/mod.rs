// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service status, and the read-only listings.

pub mod auth;
pub mod measurements;
pub mod series;
pub mod system;
