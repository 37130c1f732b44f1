//! Discord gateway handlers
//!
//! Handlers for events that are not commands, such as shard lifecycle updates.

/// Gateway event logging
pub mod events;
