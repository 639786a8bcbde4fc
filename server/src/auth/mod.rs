//! Authentication against the upstream platform.
//!
//! Callers present their upstream token; it is verified by asking upstream
//! who owns it.

pub mod error;
pub mod middleware;

pub use error::AuthError;
pub use middleware::{require_auth, AuthUser};
