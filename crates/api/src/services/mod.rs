//! Application services.

pub mod auth;
pub mod email;

pub use auth::{AuthError, AuthService};
pub use email::EmailService;
