//! Rate limiting for expensive upstream refreshes.
//!
//! A single sliding window, persisted to a JSON file so accounting survives
//! restarts.

pub mod config;
pub mod error;
pub mod limiter;
pub mod types;

pub use config::*;
pub use error::*;
pub use limiter::*;
pub use types::*;
