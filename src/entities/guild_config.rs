//! Guild config entity - Per-guild settings, currently the command prefix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Guild configuration database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "guild_config")]
pub struct Model {
    /// Discord guild ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub guild_id: i64,
    /// Command prefix used in this guild
    pub prefix: String,
}

/// `GuildConfig` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
