//! Turn-based encounter engine.
//!
//! An encounter runs one quest from the quest board to its end:
//!
//! 1. `menu` draws the quest board, spends one of the user's rolls, and waits for
//!    `accept <n>`. Without an answer the board is retracted and the encounter expires.
//! 2. `battle` waits for a valid initiative roll, decides who opens, then alternates
//!    human and monster turns until one side runs out of hit points.
//!
//! Every wait after the quest is accepted is bounded; a timeout fails the quest. All output
//! goes through [`EncounterChannel::present`], so the same engine drives Discord or a test
//! script.

pub mod turn;
pub mod view;

pub use turn::Side;
pub use view::{View, render_text};

use crate::{
    core::{
        character::Party,
        command::Command,
        deck::{Deck, mana_cost},
        dice::{self, INITIATIVE_EXPECTED},
        monsters::{Monster, MonsterManual},
    },
    errors::Result,
};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Where encounter output goes and where user input comes from.
#[async_trait]
pub trait EncounterChannel: Send {
    /// Handle to a presented message, used to retract it.
    type Message: Send;

    /// Shows a view to the user.
    async fn present(&mut self, view: View<'_>) -> Result<Self::Message>;

    /// Removes a previously presented message.
    async fn retract(&mut self, message: Self::Message) -> Result<()>;

    /// Waits up to `timeout` for the next message from the encounter's user.
    ///
    /// Returns `Ok(None)` when the wait times out.
    async fn next_input(&mut self, timeout: Duration) -> Result<Option<String>>;
}

/// Notified when a quest board is shown, which counts as a quest attempt.
#[async_trait]
pub trait QuestTally: Send {
    /// Records one quest attempt.
    async fn record_attempt(&mut self) -> Result<()>;
}

/// Timing and resource limits for an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncounterSettings {
    /// How long the quest board waits for `accept`
    pub accept_timeout: Duration,
    /// How long each wait for an initiative roll lasts
    pub initiative_timeout: Duration,
    /// How long each wait during a human turn lasts
    pub turn_timeout: Duration,
    /// Mana available on every human turn
    pub mana_per_turn: u32,
    /// Quests offered on the board
    pub quest_count: usize,
}

impl Default for EncounterSettings {
    fn default() -> Self {
        Self {
            accept_timeout: Duration::from_secs(120),
            initiative_timeout: Duration::from_secs(120),
            turn_timeout: Duration::from_secs(30),
            mana_per_turn: 6,
            quest_count: 4,
        }
    }
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The monster ran out of hit points
    Victory,
    /// The party ran out of hit points
    Defeat,
    /// The user stopped answering after accepting the quest
    Failed,
}

/// Where an encounter is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncounterState {
    /// Not started
    Menu,
    /// Quest board shown, waiting for `accept`
    AwaitingQuestAccept,
    /// Quest accepted, waiting for an initiative roll
    AwaitingInitiative,
    /// Battle in progress
    Turn(Side),
    /// Battle over
    Resolved(Outcome),
    /// The quest board timed out
    Expired,
}

impl EncounterState {
    /// Whether the encounter has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Expired)
    }
}

/// One quest, from the board to its resolution.
pub struct Encounter<'a, C, R> {
    channel: C,
    party: Party,
    manual: &'a MonsterManual,
    tally: &'a mut dyn QuestTally,
    prefix: String,
    settings: EncounterSettings,
    rng: R,
    state: EncounterState,
    quests: Vec<Monster>,
    monster: Option<Monster>,
    monster_hp: u32,
    party_hp: u32,
}

impl<'a, C, R> Encounter<'a, C, R>
where
    C: EncounterChannel,
    R: Rng + Send,
{
    /// Prepares an encounter for `party`. Nothing is shown until [`Self::menu`].
    pub fn new(
        channel: C,
        party: Party,
        manual: &'a MonsterManual,
        tally: &'a mut dyn QuestTally,
        prefix: impl Into<String>,
        settings: EncounterSettings,
        rng: R,
    ) -> Self {
        let party_hp = party.hit_points();
        Self {
            channel,
            party,
            manual,
            tally,
            prefix: prefix.into(),
            settings,
            rng,
            state: EncounterState::Menu,
            quests: Vec::new(),
            monster: None,
            monster_hp: 0,
            party_hp,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> EncounterState {
        self.state
    }

    /// Monsters offered on the quest board.
    #[must_use]
    pub fn quests(&self) -> &[Monster] {
        &self.quests
    }

    /// The accepted quest's monster.
    #[must_use]
    pub const fn monster(&self) -> Option<&Monster> {
        self.monster.as_ref()
    }

    /// Monster hit points left.
    #[must_use]
    pub const fn monster_hp(&self) -> u32 {
        self.monster_hp
    }

    /// Party hit points left.
    #[must_use]
    pub const fn party_hp(&self) -> u32 {
        self.party_hp
    }

    /// The channel the encounter talks through.
    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Runs the whole quest and returns the terminal state.
    pub async fn run(mut self) -> Result<EncounterState> {
        self.menu().await?;
        self.battle().await?;
        Ok(self.state)
    }

    /// Shows the quest board and waits for the user to accept a quest.
    ///
    /// Showing the board spends a roll whether or not a quest is accepted.
    pub async fn menu(&mut self) -> Result<()> {
        let challenge_rating = self.party.challenge_rating();
        self.quests = (0..self.settings.quest_count)
            .map(|_| self.manual.random_monster(challenge_rating, &mut self.rng))
            .collect::<Result<_>>()?;

        let board = self
            .channel
            .present(View::QuestMenu {
                prefix: &self.prefix,
                quests: &self.quests,
            })
            .await?;
        self.tally.record_attempt().await?;
        self.state = EncounterState::AwaitingQuestAccept;
        debug!(challenge_rating, "Quest board shown");

        let deadline = Instant::now() + self.settings.accept_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let input = if remaining.is_zero() {
                None
            } else {
                self.channel.next_input(remaining).await?
            };
            let Some(content) = input else {
                self.channel.retract(board).await?;
                self.state = EncounterState::Expired;
                info!("Quest board expired");
                return Ok(());
            };

            match Command::parse_prefixed(&content, &self.prefix) {
                Ok(Command::Accept(n)) if (1..=self.quests.len()).contains(&n) => {
                    let monster = self.quests[n - 1].clone();
                    debug!(quest = n, monster = %monster.name, "Quest accepted");
                    self.monster_hp = monster.hit_points;
                    self.monster = Some(monster);
                    self.state = EncounterState::AwaitingInitiative;
                    self.channel
                        .present(View::RollInitiative {
                            prefix: &self.prefix,
                        })
                        .await?;
                    return Ok(());
                }
                _ => debug!(%content, "Ignoring input while waiting for accept"),
            }
        }
    }

    /// Rolls initiative and plays turns until the battle resolves.
    ///
    /// Does nothing unless a quest has been accepted.
    pub async fn battle(&mut self) -> Result<()> {
        if self.state != EncounterState::AwaitingInitiative {
            return Ok(());
        }
        let Some(monster) = self.monster.clone() else {
            return Ok(());
        };

        let Some(user_initiative) = self.roll_initiative().await? else {
            return self.fail().await;
        };
        let first = Side::from_initiative(monster.initiative, user_initiative);
        self.channel
            .present(View::Initiative {
                monster: monster.initiative,
                user: user_initiative,
                first,
            })
            .await?;
        debug!(
            monster_initiative = monster.initiative,
            user_initiative,
            ?first,
            "Initiative decided"
        );

        self.state = EncounterState::Turn(first);
        while let EncounterState::Turn(side) = self.state {
            match side {
                Side::Human => self.human_turn(&monster).await?,
                Side::Monster => self.monster_turn(&monster).await?,
            }
        }
        Ok(())
    }

    /// Waits for a valid initiative roll; `None` when a wait times out.
    async fn roll_initiative(&mut self) -> Result<Option<u32>> {
        loop {
            let Some(content) = self
                .channel
                .next_input(self.settings.initiative_timeout)
                .await?
            else {
                return Ok(None);
            };
            let Ok(Command::Roll(expression)) = Command::parse_prefixed(&content, &self.prefix)
            else {
                continue;
            };

            match dice::roll(&expression, &INITIATIVE_EXPECTED, &mut self.rng) {
                Ok(total) if (1..=20).contains(&total) => return Ok(Some(total)),
                Ok(total) => debug!(%expression, total, "Initiative roll rejected"),
                Err(_) => {
                    self.channel
                        .present(View::InvalidRoll {
                            prefix: &self.prefix,
                            expression: &expression,
                        })
                        .await?;
                }
            }
        }
    }

    async fn human_turn(&mut self, monster: &Monster) -> Result<()> {
        let mut deck = Deck::new(&self.party, &mut self.rng);
        let mut mana = self.settings.mana_per_turn;
        self.channel
            .present(View::Hand {
                prefix: &self.prefix,
                deck: &deck,
                mana,
                party_hp: self.party_hp,
                monster,
                monster_hp: self.monster_hp,
            })
            .await?;

        loop {
            let Some(content) = self.channel.next_input(self.settings.turn_timeout).await? else {
                return self.fail().await;
            };
            match Command::parse_prefixed(&content, &self.prefix) {
                Ok(Command::Attack) => break,
                Ok(Command::Stack { card, amount }) => {
                    let (Some(index), Some(cost)) = (card.checked_sub(1), mana_cost(amount)) else {
                        continue;
                    };
                    if cost > mana {
                        debug!(cost, mana, "Not enough mana to stack");
                        continue;
                    }
                    match deck.stack(index, amount) {
                        Ok(group) => {
                            mana -= group.cost();
                            self.channel
                                .present(View::Stacked {
                                    group: &group,
                                    mana_left: mana,
                                })
                                .await?;
                        }
                        Err(e) => debug!(%e, "Stack rejected"),
                    }
                }
                _ => {}
            }
        }

        let damage = deck.attack_damage();
        self.monster_hp = self.monster_hp.saturating_sub(damage);
        self.channel
            .present(View::Attack {
                damage,
                monster,
                monster_hp: self.monster_hp,
            })
            .await?;

        if self.monster_hp == 0 {
            self.resolve(Outcome::Victory, monster).await
        } else {
            self.state = EncounterState::Turn(Side::Human.next());
            Ok(())
        }
    }

    async fn monster_turn(&mut self, monster: &Monster) -> Result<()> {
        let damage = monster.damage.roll(&mut self.rng);
        self.party_hp = self.party_hp.saturating_sub(damage);
        self.channel
            .present(View::MonsterAttack {
                monster,
                damage,
                party_hp: self.party_hp,
            })
            .await?;

        if self.party_hp == 0 {
            self.resolve(Outcome::Defeat, monster).await
        } else {
            self.state = EncounterState::Turn(Side::Monster.next());
            Ok(())
        }
    }

    async fn resolve(&mut self, outcome: Outcome, monster: &Monster) -> Result<()> {
        let view = match outcome {
            Outcome::Victory => View::Victory { monster },
            Outcome::Defeat => View::Defeat { monster },
            Outcome::Failed => View::Expired,
        };
        self.channel.present(view).await?;
        self.state = EncounterState::Resolved(outcome);
        info!(?outcome, monster = %monster.name, "Encounter resolved");
        Ok(())
    }

    async fn fail(&mut self) -> Result<()> {
        self.channel.present(View::Expired).await?;
        self.state = EncounterState::Resolved(Outcome::Failed);
        info!("Encounter timed out");
        Ok(())
    }
}
