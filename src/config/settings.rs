//! Application settings loaded from `config.toml`.
//!
//! The file has four parts: `[bot]` for Discord-facing settings, `[quests]` for quota and
//! encounter timing, `[recruits]` for the recruit name pool, and the `[[monsters]]` manual.
//! Everything except the monster manual has defaults, so a file with only monsters works.

use crate::{
    core::{encounter::EncounterSettings, roster::QuotaPolicy},
    errors::{Error, Result},
};
use chrono::TimeDelta;
use serde::Deserialize;
use std::{path::Path, time::Duration};

/// Config file used when `REALMS_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// The whole `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Discord-facing settings
    #[serde(default)]
    pub bot: BotConfig,
    /// Quota and encounter settings
    #[serde(default)]
    pub quests: QuestConfig,
    /// Recruit name pool
    #[serde(default)]
    pub recruits: RecruitConfig,
    /// The monster manual
    #[serde(default)]
    pub monsters: Vec<MonsterConfig>,
}

/// `[bot]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Prefix used in guilds that never set their own
    pub default_prefix: String,
    /// Users allowed to run owner-only commands
    pub owner_ids: Vec<u64>,
    /// Embed colour as `0xRRGGBB`
    pub colour: u32,
    /// Fixed shard count; autosharded when absent
    pub shard_count: Option<u32>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            default_prefix: "?".to_string(),
            owner_ids: Vec::new(),
            colour: 0x00e1_552a,
            shard_count: None,
        }
    }
}

/// `[quests]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuestConfig {
    /// Quest attempts granted per cooldown window
    pub rolls_per_cooldown: i32,
    /// Cooldown length once the attempts are spent
    pub cooldown_hours: i64,
    /// Seconds the quest board waits for `accept`
    pub accept_timeout_secs: u64,
    /// Seconds each wait for an initiative roll lasts
    pub initiative_timeout_secs: u64,
    /// Seconds each wait during a human turn lasts
    pub turn_timeout_secs: u64,
    /// Mana available per human turn
    pub mana_per_turn: u32,
    /// Characters taken on a quest when none are named
    pub party_size: usize,
}

impl Default for QuestConfig {
    fn default() -> Self {
        Self {
            rolls_per_cooldown: 4,
            cooldown_hours: 12,
            accept_timeout_secs: 120,
            initiative_timeout_secs: 120,
            turn_timeout_secs: 30,
            mana_per_turn: 6,
            party_size: 4,
        }
    }
}

impl QuestConfig {
    /// Encounter timing and mana built from this section.
    #[must_use]
    pub fn encounter_settings(&self) -> EncounterSettings {
        EncounterSettings {
            accept_timeout: Duration::from_secs(self.accept_timeout_secs),
            initiative_timeout: Duration::from_secs(self.initiative_timeout_secs),
            turn_timeout: Duration::from_secs(self.turn_timeout_secs),
            mana_per_turn: self.mana_per_turn,
            ..EncounterSettings::default()
        }
    }

    /// Roll quota built from this section.
    #[must_use]
    pub fn quota_policy(&self) -> QuotaPolicy {
        QuotaPolicy {
            rolls_per_cooldown: self.rolls_per_cooldown,
            cooldown: TimeDelta::hours(self.cooldown_hours),
        }
    }
}

/// `[recruits]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecruitConfig {
    /// Names a recruited character may get
    pub names: Vec<String>,
}

impl Default for RecruitConfig {
    fn default() -> Self {
        let names = [
            "Aldric", "Brienne", "Corwin", "Dagny", "Elowen", "Fenric", "Gwendolyn", "Halvard",
            "Isolde", "Jorund", "Kestrel", "Lysander", "Maren", "Nyx", "Orrin", "Perrin",
        ];
        Self {
            names: names.iter().map(ToString::to_string).collect(),
        }
    }
}

/// One `[[monsters]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MonsterConfig {
    /// Display name
    pub name: String,
    /// Challenge rating the monster is filed under
    pub challenge_rating: u32,
    /// Starting hit points
    pub hit_points: u32,
    /// Fixed initiative
    pub initiative: u32,
    /// Damage dice, e.g. `2d6`
    pub damage: String,
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or parsed, or if a quest setting is
/// out of range.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    tracing::debug!(?path, "Loading configuration");
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads settings from `REALMS_CONFIG`, or `./config.toml` when it is not set.
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var("REALMS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

/// Parses and validates settings from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

impl AppConfig {
    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(Error::Config {
                message: message.to_string(),
            })
        };
        if self.bot.default_prefix.trim().is_empty() {
            return invalid("bot.default_prefix cannot be empty");
        }
        if self.quests.rolls_per_cooldown < 1 {
            return invalid("quests.rolls_per_cooldown must be at least 1");
        }
        if self.quests.cooldown_hours < 0 {
            return invalid("quests.cooldown_hours cannot be negative");
        }
        if self.quests.party_size == 0 {
            return invalid("quests.party_size must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [bot]
            default_prefix = "r!"
            owner_ids = [1234]
            colour = 0x336699
            shard_count = 2

            [quests]
            rolls_per_cooldown = 3
            turn_timeout_secs = 45

            [recruits]
            names = ["Ash"]

            [[monsters]]
            name = "Goblin"
            challenge_rating = 1
            hit_points = 12
            initiative = 8
            damage = "1d6"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.bot.default_prefix, "r!");
        assert_eq!(config.bot.owner_ids, vec![1234]);
        assert_eq!(config.bot.colour, 0x0033_6699);
        assert_eq!(config.bot.shard_count, Some(2));
        assert_eq!(config.quests.rolls_per_cooldown, 3);
        assert_eq!(config.quests.turn_timeout_secs, 45);
        assert_eq!(config.quests.mana_per_turn, 6);
        assert_eq!(config.recruits.names, vec!["Ash".to_string()]);
        assert_eq!(config.monsters.len(), 1);
        assert_eq!(config.monsters[0].damage, "1d6");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.bot.default_prefix, "?");
        assert_eq!(config.bot.colour, 0x00e1_552a);
        assert_eq!(config.bot.shard_count, None);
        assert_eq!(config.quests, QuestConfig::default());
        assert!(!config.recruits.names.is_empty());
        assert!(config.monsters.is_empty());
    }

    #[test]
    fn test_quest_config_conversions() {
        let quests = QuestConfig {
            turn_timeout_secs: 10,
            mana_per_turn: 8,
            cooldown_hours: 6,
            ..QuestConfig::default()
        };

        let settings = quests.encounter_settings();
        assert_eq!(settings.turn_timeout, Duration::from_secs(10));
        assert_eq!(settings.accept_timeout, Duration::from_secs(120));
        assert_eq!(settings.mana_per_turn, 8);
        assert_eq!(settings.quest_count, 4);

        let policy = quests.quota_policy();
        assert_eq!(policy.rolls_per_cooldown, 4);
        assert_eq!(policy.cooldown, TimeDelta::hours(6));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for bad in [
            "[bot]\ndefault_prefix = \"  \"",
            "[quests]\nrolls_per_cooldown = 0",
            "[quests]\nparty_size = 0",
            "[quests]\ncooldown_hours = -1",
            "[[monsters]]\nname = \"Goblin\"",
            "not toml at all",
        ] {
            assert!(
                matches!(parse_config(bad), Err(Error::Config { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("does/not/exist.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(!config.monsters.is_empty());
    }
}
