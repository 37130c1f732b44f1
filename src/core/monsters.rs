//! Monster manual and rating-bounded monster selection.

use crate::{
    config::settings::MonsterConfig,
    core::dice::DiceExpr,
    errors::{Error, Result},
};
use rand::Rng;
use std::collections::BTreeMap;

/// How far above the party's rating a quest monster may be drawn.
pub const CHALLENGE_SPREAD: u32 = 5;

/// A monster a party can be sent against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    /// Display name
    pub name: String,
    /// Challenge rating band this monster sits in
    pub challenge_rating: u32,
    /// Starting hit points
    pub hit_points: u32,
    /// Fixed initiative compared against the user's roll
    pub initiative: u32,
    /// Damage rolled on each of the monster's turns
    pub damage: DiceExpr,
}

impl Monster {
    /// Name as shown on the quest board, e.g. `Goblin (CR 1)`.
    #[must_use]
    pub fn format_name(&self) -> String {
        format!("{} (CR {})", self.name, self.challenge_rating)
    }
}

impl TryFrom<&MonsterConfig> for Monster {
    type Error = Error;

    fn try_from(config: &MonsterConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(Error::Config {
                message: "Monster name cannot be empty".to_string(),
            });
        }
        let damage = DiceExpr::parse(&config.damage).map_err(|_| Error::Config {
            message: format!(
                "Monster '{}' has invalid damage dice '{}'",
                config.name, config.damage
            ),
        })?;

        Ok(Self {
            name: config.name.trim().to_string(),
            challenge_rating: config.challenge_rating,
            hit_points: config.hit_points,
            initiative: config.initiative,
            damage,
        })
    }
}

/// Every monster the bot knows, indexed by challenge rating.
#[derive(Debug, Clone, Default)]
pub struct MonsterManual {
    by_rating: BTreeMap<u32, Vec<Monster>>,
}

impl MonsterManual {
    /// Builds a manual from validated monsters.
    #[must_use]
    pub fn new(monsters: Vec<Monster>) -> Self {
        let mut by_rating: BTreeMap<u32, Vec<Monster>> = BTreeMap::new();
        for monster in monsters {
            by_rating
                .entry(monster.challenge_rating)
                .or_default()
                .push(monster);
        }
        Self { by_rating }
    }

    /// Builds a manual from the `[[monsters]]` section of the config file.
    pub fn from_config(entries: &[MonsterConfig]) -> Result<Self> {
        let monsters = entries
            .iter()
            .map(Monster::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(monsters))
    }

    /// Total number of monsters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_rating.values().map(Vec::len).sum()
    }

    /// Whether the manual holds no monsters at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_rating.is_empty()
    }

    /// Picks a random monster of exactly `challenge_rating`.
    pub fn monster_at<R: Rng>(&self, challenge_rating: u32, rng: &mut R) -> Result<&Monster> {
        let pool = self
            .by_rating
            .get(&challenge_rating)
            .filter(|pool| !pool.is_empty())
            .ok_or(Error::EmptyMonsterPool { challenge_rating })?;
        Ok(&pool[rng.random_range(0..pool.len())])
    }

    /// Draws a rating uniformly from `min_cr..=min_cr + 5` and returns a monster at that rating.
    pub fn random_monster<R: Rng>(&self, min_cr: u32, rng: &mut R) -> Result<Monster> {
        let drawn = rng.random_range(min_cr..=min_cr.saturating_add(CHALLENGE_SPREAD));
        self.monster_at(drawn, rng).cloned()
    }
}
