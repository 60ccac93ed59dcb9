pub mod auth;
pub mod dashboard;
pub mod measurements;
pub mod series;
