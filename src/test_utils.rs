//! Shared test utilities.
//!
//! Fixtures for the game core (characters, monster manuals) plus recording fakes for the
//! storage and event seams and a scripted channel that drives encounters without Discord.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        character::{Character, Party},
        dice::DiceExpr,
        encounter::{EncounterChannel, QuestTally, View, render_text},
        monsters::{Monster, MonsterManual},
        roster::{CharacterStore, RosterChanged, RosterDocument, RosterSink},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Highest challenge rating the fixture manuals cover.
pub const MAX_FIXTURE_RATING: u32 = 30;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Four distinct characters with ids 1 to 4.
pub fn sample_characters() -> Vec<Character> {
    vec![
        Character::new(1, "Aria", 3, 30),
        Character::new(2, "Bram", 5, 45),
        Character::new(3, "Cole", 2, 20),
        Character::new(4, "Dara", 4, 36),
    ]
}

/// A party with a single level `level` character named Hero.
pub fn solo_party(level: u32, hit_points: u32) -> Party {
    Party::new(vec![Character::new(1, "Hero", level, hit_points)]).unwrap()
}

/// Two monsters at every rating from 0 to [`MAX_FIXTURE_RATING`].
pub fn sample_manual() -> MonsterManual {
    let monsters = (0..=MAX_FIXTURE_RATING)
        .flat_map(|cr| {
            ["Goblin", "Wraith"].into_iter().map(move |kind| Monster {
                name: format!("{kind} {cr}"),
                challenge_rating: cr,
                hit_points: 10 + cr * 8,
                initiative: 5 + cr % 15,
                damage: DiceExpr {
                    count: 1 + cr / 5,
                    sides: 6,
                },
            })
        })
        .collect();
    MonsterManual::new(monsters)
}

/// Identical monsters at every rating, so encounter tests know exactly what they face.
pub fn flat_manual(hit_points: u32, initiative: u32, damage: &str) -> MonsterManual {
    let damage = DiceExpr::parse(damage).unwrap();
    let monsters = (0..=MAX_FIXTURE_RATING)
        .map(|cr| Monster {
            name: "Training Dummy".to_string(),
            challenge_rating: cr,
            hit_points,
            initiative,
            damage,
        })
        .collect();
    MonsterManual::new(monsters)
}

/// A call made against [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Add(u64, RosterDocument),
    Update(u64, Vec<Character>),
    Reset(u64),
}

/// A [`CharacterStore`] that records writes and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    fail_next: AtomicBool,
}

impl RecordingStore {
    /// Writes recorded so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Makes the next write fail with a database error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(Error::Database(DbErr::Custom("injected failure".to_string())));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl CharacterStore for RecordingStore {
    async fn get_characters(&self, _user_id: u64) -> Result<RosterDocument> {
        Ok(RosterDocument::default())
    }

    async fn add_characters(&self, user_id: u64, document: &RosterDocument) -> Result<()> {
        self.record(StoreCall::Add(user_id, document.clone()))
    }

    async fn update_characters(&self, user_id: u64, characters: &[Character]) -> Result<()> {
        self.record(StoreCall::Update(user_id, characters.to_vec()))
    }

    async fn reset_characters(&self, user_id: u64) -> Result<()> {
        self.record(StoreCall::Reset(user_id))
    }
}

/// A [`RosterSink`] that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<RosterChanged>>,
}

impl RecordingSink {
    /// Events received so far.
    pub fn events(&self) -> Vec<RosterChanged> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl RosterSink for RecordingSink {
    async fn roster_changed(&self, event: RosterChanged) {
        self.events.lock().unwrap().push(event);
    }
}

/// An [`EncounterChannel`] fed from a script.
///
/// Each queued `None` is a timeout; an exhausted script times out forever. Presented views
/// are kept as rendered text and message handles are their index in that list. Every wait
/// is recorded with the timeout the encounter asked for.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    inputs: VecDeque<(Duration, Option<String>)>,
    presented: Vec<String>,
    retracted: Vec<usize>,
    waits: Vec<Duration>,
}

impl ScriptedChannel {
    pub fn new<'s>(inputs: impl IntoIterator<Item = Option<&'s str>>) -> Self {
        Self::timed(inputs.into_iter().map(|input| (Duration::ZERO, input)))
    }

    /// Each input arrives after its delay on the tokio clock. An input that would arrive
    /// after the wait's timeout is dropped and the wait times out.
    pub fn timed<'s>(inputs: impl IntoIterator<Item = (Duration, Option<&'s str>)>) -> Self {
        Self {
            inputs: inputs
                .into_iter()
                .map(|(delay, input)| (delay, input.map(str::to_string)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn presented(&self) -> &[String] {
        &self.presented
    }

    pub fn retracted(&self) -> &[usize] {
        &self.retracted
    }

    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }
}

#[async_trait]
impl EncounterChannel for ScriptedChannel {
    type Message = usize;

    async fn present(&mut self, view: View<'_>) -> Result<usize> {
        self.presented.push(render_text(&view));
        Ok(self.presented.len() - 1)
    }

    async fn retract(&mut self, message: usize) -> Result<()> {
        self.retracted.push(message);
        Ok(())
    }

    async fn next_input(&mut self, timeout: Duration) -> Result<Option<String>> {
        self.waits.push(timeout);
        let Some((delay, input)) = self.inputs.pop_front() else {
            return Ok(None);
        };
        if delay >= timeout {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(input)
    }
}

/// A [`QuestTally`] that only counts.
#[derive(Debug, Default)]
pub struct CountingTally {
    pub attempts: usize,
}

#[async_trait]
impl QuestTally for CountingTally {
    async fn record_attempt(&mut self) -> Result<()> {
        self.attempts += 1;
        Ok(())
    }
}
