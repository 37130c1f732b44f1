//! Entity module - Contains all SeaORM entity definitions for the database.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod guild_config;
pub mod user_characters;

// Re-export specific types to avoid conflicts
pub use guild_config::{
    Column as GuildConfigColumn, Entity as GuildConfig, Model as GuildConfigModel,
};
pub use user_characters::{
    Column as UserCharactersColumn, Entity as UserCharacters, Model as UserCharactersModel,
};
