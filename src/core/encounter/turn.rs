//! Turn order for a battle.

/// Who acts on a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The user and their party
    Human,
    /// The quest monster
    Monster,
}

impl Side {
    /// The side acting after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Human => Self::Monster,
            Self::Monster => Self::Human,
        }
    }

    /// Who opens the battle. The monster only goes first with a strictly higher initiative.
    #[must_use]
    pub const fn from_initiative(monster_initiative: u32, user_initiative: u32) -> Self {
        if monster_initiative > user_initiative {
            Self::Monster
        } else {
            Self::Human
        }
    }
}
