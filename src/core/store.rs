//! `SeaORM`-backed [`CharacterStore`] over the `user_characters` table.

use crate::{
    core::{
        character::Character,
        roster::{CharacterStore, Rank, RosterDocument},
    },
    entities::{UserCharacters, user_characters},
    errors::Result,
};
use async_trait::async_trait;
use sea_orm::{Set, prelude::*, sea_query::Expr};
use tracing::{debug, warn};

/// Converts a Discord snowflake to the signed column type, preserving its bits.
#[allow(clippy::cast_possible_wrap)]
pub(crate) const fn db_id(id: u64) -> i64 {
    id as i64
}

/// Persists roster documents, one row per user.
#[derive(Debug, Clone)]
pub struct SeaOrmCharacterStore {
    db: DatabaseConnection,
}

impl SeaOrmCharacterStore {
    /// Wraps a database connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CharacterStore for SeaOrmCharacterStore {
    async fn get_characters(&self, user_id: u64) -> Result<RosterDocument> {
        let Some(row) = UserCharacters::find_by_id(db_id(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(RosterDocument::default());
        };

        let characters: Vec<Character> = serde_json::from_value(row.characters)?;
        Ok(RosterDocument {
            characters,
            rank: Rank {
                ranking: row.ranking,
                power: row.power,
                total_character: row.total_character,
            },
        })
    }

    async fn add_characters(&self, user_id: u64, document: &RosterDocument) -> Result<()> {
        let row = user_characters::ActiveModel {
            user_id: Set(db_id(user_id)),
            characters: Set(serde_json::to_value(&document.characters)?),
            ranking: Set(document.rank.ranking),
            power: Set(document.rank.power),
            total_character: Set(document.rank.total_character),
        };
        row.insert(&self.db).await?;
        debug!(user_id, "Roster document created");
        Ok(())
    }

    async fn update_characters(&self, user_id: u64, characters: &[Character]) -> Result<()> {
        let result = UserCharacters::update_many()
            .col_expr(
                user_characters::Column::Characters,
                Expr::value(serde_json::to_value(characters)?),
            )
            .filter(user_characters::Column::UserId.eq(db_id(user_id)))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            warn!(user_id, "Updated characters of a user with no roster document");
        }
        Ok(())
    }

    async fn reset_characters(&self, user_id: u64) -> Result<()> {
        UserCharacters::delete_by_id(db_id(user_id))
            .exec(&self.db)
            .await?;
        debug!(user_id, "Roster document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_characters, setup_test_db};

    #[tokio::test]
    async fn test_missing_user_gets_empty_document() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        let document = store.get_characters(42).await?;
        assert_eq!(document, RosterDocument::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_then_get_round_trips_document() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        let document = RosterDocument {
            characters: sample_characters(),
            rank: Rank {
                ranking: 3,
                power: 120,
                total_character: 4,
            },
        };

        store.add_characters(42, &document).await?;

        assert_eq!(store.get_characters(42).await?, document);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_twice_fails() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        store.add_characters(1, &RosterDocument::default()).await?;
        assert!(store.add_characters(1, &RosterDocument::default()).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_replaces_characters_and_keeps_rank() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        let characters = sample_characters();
        let rank = Rank {
            ranking: 1,
            power: 10,
            total_character: 9,
        };
        store
            .add_characters(
                5,
                &RosterDocument {
                    characters: characters[..1].to_vec(),
                    rank,
                },
            )
            .await?;

        store.update_characters(5, &characters[1..]).await?;

        let stored = store.get_characters(5).await?;
        assert_eq!(stored.characters, characters[1..].to_vec());
        assert_eq!(stored.rank, rank);
        Ok(())
    }

    #[tokio::test]
    async fn test_reset_deletes_document() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        let document = RosterDocument {
            characters: sample_characters(),
            ..RosterDocument::default()
        };
        store.add_characters(5, &document).await?;

        store.reset_characters(5).await?;

        assert_eq!(store.get_characters(5).await?, RosterDocument::default());
        Ok(())
    }

    #[tokio::test]
    async fn test_large_snowflakes_survive_storage() -> Result<()> {
        let store = SeaOrmCharacterStore::new(setup_test_db().await?);
        let user_id = u64::MAX - 1;
        let document = RosterDocument {
            characters: sample_characters(),
            ..RosterDocument::default()
        };
        store.add_characters(user_id, &document).await?;
        assert_eq!(store.get_characters(user_id).await?, document);
        Ok(())
    }
}
