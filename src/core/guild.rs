//! Per-guild command prefixes.

use crate::{
    core::store::db_id,
    entities::{GuildConfig, guild_config},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*, sea_query::OnConflict};
use tracing::info;

/// Longest prefix a guild may set.
pub const MAX_PREFIX_LEN: usize = 5;

/// Returns the guild's stored prefix, if it ever set one.
pub async fn get_prefix(db: &DatabaseConnection, guild_id: u64) -> Result<Option<String>> {
    Ok(GuildConfig::find_by_id(db_id(guild_id))
        .one(db)
        .await?
        .map(|row| row.prefix))
}

/// Stores the guild's prefix, replacing any previous one. Returns the trimmed prefix.
pub async fn set_prefix(db: &DatabaseConnection, guild_id: u64, prefix: &str) -> Result<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() || prefix.chars().count() > MAX_PREFIX_LEN {
        return Err(Error::InvalidPrefix {
            prefix: prefix.to_string(),
            max_len: MAX_PREFIX_LEN,
        });
    }

    GuildConfig::insert(guild_config::ActiveModel {
        guild_id: Set(db_id(guild_id)),
        prefix: Set(prefix.to_string()),
    })
    .on_conflict(
        OnConflict::column(guild_config::Column::GuildId)
            .update_column(guild_config::Column::Prefix)
            .to_owned(),
    )
    .exec(db)
    .await?;

    info!(guild_id, prefix, "Guild prefix updated");
    Ok(prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_unset_prefix_is_none() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(get_prefix(&db, 10).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_prefix_upserts() -> Result<()> {
        let db = setup_test_db().await?;

        set_prefix(&db, 10, "!").await?;
        assert_eq!(get_prefix(&db, 10).await?, Some("!".to_string()));

        set_prefix(&db, 10, " r! ").await?;
        assert_eq!(get_prefix(&db, 10).await?, Some("r!".to_string()));
        assert_eq!(get_prefix(&db, 11).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_rejects_empty_and_long_prefixes() -> Result<()> {
        let db = setup_test_db().await?;
        for bad in ["", "   ", "toolong"] {
            assert!(matches!(
                set_prefix(&db, 10, bad).await,
                Err(Error::InvalidPrefix { max_len: MAX_PREFIX_LEN, .. })
            ));
        }

        let Err(Error::InvalidPrefix { prefix, .. }) = set_prefix(&db, 10, " toolong ").await
        else {
            panic!("a seven character prefix should be rejected");
        };
        assert_eq!(prefix, "toolong");
        assert_eq!(get_prefix(&db, 10).await?, None);
        Ok(())
    }
}
