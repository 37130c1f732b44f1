//! Roster ledger - a user's characters plus their quest quota and cooldown.
//!
//! Characters are persisted through a [`CharacterStore`] after every change. The roll quota
//! and cooldown live only in memory; every successful mutation is announced to a
//! [`RosterSink`] as a [`RosterChanged`] event so caches can replace their copy.

use crate::{
    core::{character::Character, encounter::QuestTally},
    errors::{Error, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Characters shown per page of the roster listing.
pub const PAGE_SIZE: usize = 10;

/// Leaderboard summary stored alongside the characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rank {
    /// Position on the leaderboard
    pub ranking: i32,
    /// Accumulated power score
    pub power: i32,
    /// Characters ever collected
    pub total_character: i32,
}

/// The persisted shape of a roster: `{characters: [...], rank: {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterDocument {
    /// Characters in acquisition order
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Leaderboard summary
    #[serde(default)]
    pub rank: Rank,
}

/// Storage collaborator for roster documents.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Loads a user's document; a user without one gets an empty document.
    async fn get_characters(&self, user_id: u64) -> Result<RosterDocument>;
    /// Creates the user's document.
    async fn add_characters(&self, user_id: u64, document: &RosterDocument) -> Result<()>;
    /// Replaces the character list of an existing document.
    async fn update_characters(&self, user_id: u64, characters: &[Character]) -> Result<()>;
    /// Deletes the user's document.
    async fn reset_characters(&self, user_id: u64) -> Result<()>;
}

/// Announcement that a user's roster changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterChanged {
    /// Owner of the roster
    pub user_id: u64,
    /// The roster after the change
    pub snapshot: Roster,
}

/// Receiver of [`RosterChanged`] events.
#[async_trait]
pub trait RosterSink: Send + Sync {
    /// Called once after every successful roster mutation.
    async fn roster_changed(&self, event: RosterChanged);
}

/// How many quests a user gets and how long the cooldown lasts once they run out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    /// Rolls granted per cooldown window
    pub rolls_per_cooldown: i32,
    /// Cooldown length once the rolls are spent
    pub cooldown: TimeDelta,
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            rolls_per_cooldown: 4,
            cooldown: TimeDelta::hours(12),
        }
    }
}

/// A user's characters and quota, as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    user_id: u64,
    characters: Vec<Character>,
    rank: Rank,
    rolls_left: i32,
    cooldown_expires_at: Option<DateTime<Utc>>,
}

impl Roster {
    /// Builds a roster from a stored document and the current quota.
    #[must_use]
    pub fn from_document(
        user_id: u64,
        document: RosterDocument,
        rolls_left: i32,
        cooldown_expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            characters: document.characters,
            rank: document.rank,
            rolls_left,
            cooldown_expires_at,
        }
    }

    /// Owner of the roster.
    #[must_use]
    pub const fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Characters in acquisition order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Leaderboard summary.
    #[must_use]
    pub const fn rank(&self) -> Rank {
        self.rank
    }

    /// Remaining quest rolls; may be negative.
    #[must_use]
    pub const fn rolls_left(&self) -> i32 {
        self.rolls_left
    }

    /// When the current cooldown ends, if one is running.
    #[must_use]
    pub const fn cooldown_expires_at(&self) -> Option<DateTime<Utc>> {
        self.cooldown_expires_at
    }

    /// Number of characters owned.
    #[must_use]
    pub fn amount_of_items(&self) -> usize {
        self.characters.len()
    }

    /// Finds a character by id.
    #[must_use]
    pub fn character(&self, id: u64) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Remaining cooldown as `Hh, Mm, Ss` measured from `now`, or `None` without a cooldown.
    #[must_use]
    pub fn expires_in_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.cooldown_expires_at.map(|expires| {
            let seconds = (expires - now).num_seconds().max(0);
            let (hours, rest) = (seconds / 3600, seconds % 3600);
            format!("{hours}h, {}m, {}s", rest / 60, rest % 60)
        })
    }

    /// Remaining cooldown as `Hh, Mm, Ss`, or `None` without a cooldown.
    #[must_use]
    pub fn expires_in(&self) -> Option<String> {
        self.expires_in_at(Utc::now())
    }

    /// Number of [`PAGE_SIZE`] pages needed to list every character.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.characters.len().div_ceil(PAGE_SIZE)
    }

    /// Characters in pages of [`PAGE_SIZE`]; the last page may be shorter.
    ///
    /// Each call starts over from the first page.
    pub fn blocks(&self) -> std::slice::Chunks<'_, Character> {
        self.characters.chunks(PAGE_SIZE)
    }

    fn document(&self) -> RosterDocument {
        RosterDocument {
            characters: self.characters.clone(),
            rank: self.rank,
        }
    }
}

/// Mutation front-end for a [`Roster`], persisting and announcing every change.
///
/// Callers must not drive two ledgers for the same user at once; writes are full replaces
/// and the last one wins.
pub struct RosterLedger {
    roster: Roster,
    policy: QuotaPolicy,
    store: Arc<dyn CharacterStore>,
    sink: Arc<dyn RosterSink>,
}

impl RosterLedger {
    /// Wraps an already loaded roster.
    #[must_use]
    pub fn new(
        roster: Roster,
        policy: QuotaPolicy,
        store: Arc<dyn CharacterStore>,
        sink: Arc<dyn RosterSink>,
    ) -> Self {
        Self {
            roster,
            policy,
            store,
            sink,
        }
    }

    /// Loads a user's characters from storage with a full, fresh quota.
    pub async fn load(
        user_id: u64,
        policy: QuotaPolicy,
        store: Arc<dyn CharacterStore>,
        sink: Arc<dyn RosterSink>,
    ) -> Result<Self> {
        let document = store.get_characters(user_id).await?;
        debug!(
            user_id,
            characters = document.characters.len(),
            "Loaded roster from storage"
        );
        let roster = Roster::from_document(user_id, document, policy.rolls_per_cooldown, None);
        Ok(Self::new(roster, policy, store, sink))
    }

    /// The current roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Consumes the ledger, returning the roster.
    #[must_use]
    pub fn into_roster(self) -> Roster {
        self.roster
    }

    async fn announce(&self) {
        self.sink
            .roster_changed(RosterChanged {
                user_id: self.roster.user_id,
                snapshot: self.roster.clone(),
            })
            .await;
    }

    /// Appends a character.
    ///
    /// The first character creates the stored document; later ones update it.
    pub async fn submit_character(&mut self, character: Character) -> Result<()> {
        if self.roster.character(character.id).is_some() {
            return Err(Error::DuplicateCharacter { id: character.id });
        }

        let user_id = self.roster.user_id;
        let was_empty = self.roster.characters.is_empty();
        self.roster.characters.push(character);

        let persisted = if was_empty {
            self.store.add_characters(user_id, &self.roster.document()).await
        } else {
            self.store
                .update_characters(user_id, &self.roster.characters)
                .await
        };
        if let Err(e) = persisted {
            self.roster.characters.pop();
            return Err(e);
        }

        info!(
            user_id,
            total = self.roster.characters.len(),
            "Character added to roster"
        );
        self.announce().await;
        Ok(())
    }

    /// Removes a character by id and returns it.
    ///
    /// Removing the last character deletes the stored document.
    pub async fn dump_character(&mut self, id: u64) -> Result<Character> {
        let index = self
            .roster
            .characters
            .iter()
            .position(|c| c.id == id)
            .ok_or(Error::CharacterNotFound { id })?;

        let user_id = self.roster.user_id;
        let removed = self.roster.characters.remove(index);
        let persisted = if self.roster.characters.is_empty() {
            self.store.reset_characters(user_id).await
        } else {
            self.store
                .update_characters(user_id, &self.roster.characters)
                .await
        };
        if let Err(e) = persisted {
            self.roster.characters.insert(index, removed);
            return Err(e);
        }

        info!(user_id, character_id = id, "Character removed from roster");
        self.announce().await;
        Ok(removed)
    }

    /// Adds `delta` to the remaining rolls, measured at `now`.
    ///
    /// Dropping to zero or below starts a cooldown if none is running; going back above
    /// zero clears it.
    pub async fn update_rolls_at(&mut self, delta: i32, now: DateTime<Utc>) {
        self.roster.rolls_left = self.roster.rolls_left.saturating_add(delta);
        if self.roster.rolls_left <= 0 {
            if self.roster.cooldown_expires_at.is_none() {
                self.roster.cooldown_expires_at = Some(now + self.policy.cooldown);
            }
        } else {
            self.roster.cooldown_expires_at = None;
        }
        debug!(
            user_id = self.roster.user_id,
            rolls_left = self.roster.rolls_left,
            "Rolls updated"
        );
        self.announce().await;
    }

    /// Adds `delta` to the remaining rolls.
    pub async fn update_rolls(&mut self, delta: i32) {
        self.update_rolls_at(delta, Utc::now()).await;
    }

    /// Restores the full quota once the cooldown has passed. Returns whether it did.
    pub async fn replenish_if_expired(&mut self, now: DateTime<Utc>) -> bool {
        match self.roster.cooldown_expires_at {
            Some(expires) if expires <= now => {
                let delta = self.policy.rolls_per_cooldown - self.roster.rolls_left;
                self.update_rolls_at(delta, now).await;
                info!(user_id = self.roster.user_id, "Quest quota replenished");
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl QuestTally for RosterLedger {
    async fn record_attempt(&mut self) -> Result<()> {
        self.update_rolls(-1).await;
        Ok(())
    }
}
