//! Database configuration module.
//!
//! Handles the `SQLite` connection and creates the tables from the entity definitions with
//! `SeaORM`'s `Schema::create_table_from_entity`, so the schema always matches the models.

use crate::entities::{GuildConfig, UserCharacters};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::info;

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/realms.sqlite?mode=rwc";

/// Gets the database URL from the environment or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory a file-backed `SQLite` URL lives in, if it names one.
fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next()?;
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Connects to the database named by `DATABASE_URL`, creating the `SQLite` directory if needed.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    info!(%database_url, "Connecting to database");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates every table that does not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_characters_table = schema
        .create_table_from_entity(UserCharacters)
        .if_not_exists()
        .to_owned();
    let guild_config_table = schema
        .create_table_from_entity(GuildConfig)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&user_characters_table)).await?;
    db.execute(builder.build(&guild_config_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GuildConfigModel, UserCharactersModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<UserCharactersModel> = UserCharacters::find().limit(1).all(&db).await?;
        let _: Vec<GuildConfigModel> = GuildConfig::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir(DEFAULT_DATABASE_URL),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite://realms.sqlite"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/realms"), None);
    }

    #[tokio::test]
    async fn test_create_tables_twice_is_harmless() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
