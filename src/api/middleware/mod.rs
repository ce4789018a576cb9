//! API Middleware Module
//!
//! Access token authentication for the protected profile, upgrade, and
//! usage endpoints.

pub mod auth;
pub mod service;

pub use auth::{extract_bearer_token, AuthUserExt, AuthenticatedUser};
pub use service::RequireAuth;
