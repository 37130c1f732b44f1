//! User characters entity - One row per user holding their whole roster.
//!
//! The character list is stored as a JSON array; the leaderboard summary lives in plain
//! integer columns next to it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Roster database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_characters")]
pub struct Model {
    /// Discord user ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Characters in acquisition order, as a JSON array
    pub characters: Json,
    /// Leaderboard position
    pub ranking: i32,
    /// Accumulated power score
    pub power: i32,
    /// Characters ever collected
    pub total_character: i32,
}

/// `UserCharacters` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
