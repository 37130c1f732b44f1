//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Guild prefix management
pub mod prefix;

/// The quest command
pub mod quest;

/// Roster and quota commands
pub mod roster;

use crate::{bot::BotData, errors::Error};

// Export commands
pub use general::*;
pub use prefix::*;
pub use quest::*;
pub use roster::*;

/// Every command the bot registers.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        ping(),
        help(),
        quest(),
        characters(),
        recruit(),
        dump(),
        rolls(),
        prefix(),
    ]
}
