//! Archive Gate Server
//!
//! Private viewer for a chat platform's message archive. Decides which
//! channels a user may see by replaying the upstream platform's permission
//! rules, and throttles expensive history refreshes.

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod permissions;
pub mod ratelimit;
