//! Unified error type for the bot and its game core.

use thiserror::Error;

/// Every failure the bot can surface, from configuration through to chat input.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file or value is missing or malformed
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description of the problem
        message: String,
    },

    /// Storage failure reported by `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Required environment variable is not set
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A persisted document could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A dice expression did not match `[count]d<sides>`
    #[error("Invalid dice expression: '{expression}'")]
    InvalidDice {
        /// The rejected expression
        expression: String,
    },

    /// Chat input that is not one of the encounter commands
    #[error("Unrecognized command: '{input}'")]
    UnrecognizedCommand {
        /// The rejected input
        input: String,
    },

    /// The monster manual has nothing at the drawn challenge rating
    #[error("No monster in the manual has challenge rating {challenge_rating}")]
    EmptyMonsterPool {
        /// The rating that was drawn
        challenge_rating: u32,
    },

    /// An encounter was started without any characters
    #[error("The party has no characters")]
    EmptyParty,

    /// A character id is already on the roster
    #[error("Character {id} is already on the roster")]
    DuplicateCharacter {
        /// The duplicated id
        id: u64,
    },

    /// A character id is not on the roster
    #[error("Character {id} is not on the roster")]
    CharacterNotFound {
        /// The missing id
        id: u64,
    },

    /// A guild prefix that is empty or longer than the allowed length
    #[error("Prefix '{prefix}' must be 1 to {max_len} characters")]
    InvalidPrefix {
        /// The rejected prefix, trimmed
        prefix: String,
        /// Longest accepted prefix
        max_len: usize,
    },

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
