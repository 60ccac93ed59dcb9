pub mod password; // PUT /auth/change-password

pub use password::change_password_put;
