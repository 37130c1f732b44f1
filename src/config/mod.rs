/// Database configuration and connection management
pub mod database;

/// Bot, quest, and monster settings from config.toml
pub mod settings;
