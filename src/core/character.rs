//! Characters and the party a user fields into an encounter.

use crate::errors::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A collectible character. Stored on a user's roster as a plain record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Roster-unique identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Character level, used for challenge rating and damage
    pub level: u32,
    /// Hit points contributed to the party pool
    pub hit_points: u32,
}

impl Character {
    /// Creates a character record.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, level: u32, hit_points: u32) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            hit_points,
        }
    }

    /// Rolls a fresh level 1-5 character with a random id drawn from `names`.
    ///
    /// Returns `None` when `names` is empty.
    pub fn recruit<R: Rng>(names: &[String], rng: &mut R) -> Option<Self> {
        if names.is_empty() {
            return None;
        }
        let name = &names[rng.random_range(0..names.len())];
        let level = rng.random_range(1..=5);
        let hit_points = level * 8 + rng.random_range(0..=8);
        Some(Self::new(rng.random(), name.clone(), level, hit_points))
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (Lv {}, {} HP)", self.name, self.level, self.hit_points)
    }
}

/// The characters fielded into an encounter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    characters: Vec<Character>,
}

impl Party {
    /// Builds a party from explicit members.
    pub fn new(characters: Vec<Character>) -> Result<Self> {
        if characters.is_empty() {
            return Err(Error::EmptyParty);
        }
        Ok(Self { characters })
    }

    /// Picks party members from a roster.
    ///
    /// With no `ids` the first `size` roster characters are fielded. Otherwise every id must
    /// be on the roster; duplicates are fielded once and the party is capped at `size`.
    pub fn select(roster: &[Character], ids: &[u64], size: usize) -> Result<Self> {
        let members: Vec<Character> = if ids.is_empty() {
            roster.iter().take(size).cloned().collect()
        } else {
            let mut members: Vec<Character> = Vec::new();
            for &id in ids {
                let character = roster
                    .iter()
                    .find(|c| c.id == id)
                    .ok_or(Error::CharacterNotFound { id })?;
                if members.iter().all(|m| m.id != id) {
                    members.push(character.clone());
                }
            }
            members.truncate(size);
            members
        };
        Self::new(members)
    }

    /// Party members in selection order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Mean member level halved, rounded down.
    #[must_use]
    pub fn challenge_rating(&self) -> u32 {
        let total: u32 = self.characters.iter().map(|c| c.level).sum();
        // `characters` is never empty
        total / u32::try_from(self.characters.len()).unwrap_or(u32::MAX) / 2
    }

    /// Combined hit points of every member.
    #[must_use]
    pub fn hit_points(&self) -> u32 {
        self.characters.iter().map(|c| c.hit_points).sum()
    }
}
