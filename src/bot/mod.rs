//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the game core to Discord: poise commands, the message-collector
//! encounter channel, gateway event logging, and the shared bot context.

/// Discord-backed encounter channel
pub mod channel;
/// Discord command implementations (general, quest, roster, prefix)
pub mod commands;
/// Gateway event handlers
pub mod handlers;

use crate::{
    config::settings::AppConfig,
    core::{
        cache::{ReadThroughCache, RosterCache},
        guild,
        monsters::MonsterManual,
        roster::{CharacterStore, RosterLedger, RosterSink},
        store::SeaOrmCharacterStore,
    },
    errors::{Error, Result},
};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{debug, error, info, instrument, warn};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub settings: AppConfig,
    /// Monsters quests are drawn from
    pub manual: MonsterManual,
    /// Command prefix per guild
    pub prefixes: ReadThroughCache<u64, String>,
    /// Latest roster snapshot per user, including the in-memory roll quota
    pub rosters: Arc<RosterCache>,
    /// Character persistence
    pub store: Arc<SeaOrmCharacterStore>,
    questing: Mutex<HashSet<u64>>,
}

impl BotData {
    /// Creates the shared context around an open database connection.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: AppConfig, manual: MonsterManual) -> Self {
        Self {
            store: Arc::new(SeaOrmCharacterStore::new(database.clone())),
            database,
            settings,
            manual,
            prefixes: ReadThroughCache::new(),
            rosters: Arc::new(RosterCache::new()),
            questing: Mutex::new(HashSet::new()),
        }
    }

    /// The command prefix for a guild, or the default prefix outside guilds.
    pub async fn prefix_for(&self, guild_id: Option<serenity::GuildId>) -> Result<String> {
        let default = &self.settings.bot.default_prefix;
        let Some(guild_id) = guild_id.map(serenity::GuildId::get) else {
            return Ok(default.clone());
        };
        self.prefixes
            .get_or_fetch(guild_id, || async move {
                Ok(guild::get_prefix(&self.database, guild_id)
                    .await?
                    .unwrap_or_else(|| default.clone()))
            })
            .await
    }

    /// Opens a ledger on a user's roster, loading it on first use.
    ///
    /// An expired cooldown is replenished before the ledger is handed out.
    pub async fn ledger(&self, user_id: u64) -> Result<RosterLedger> {
        let policy = self.settings.quests.quota_policy();
        let store: Arc<dyn CharacterStore> = Arc::clone(&self.store) as Arc<dyn CharacterStore>;
        let sink: Arc<dyn RosterSink> = Arc::clone(&self.rosters) as Arc<dyn RosterSink>;

        let roster = self
            .rosters
            .get_or_fetch(user_id, || {
                let (store, sink) = (Arc::clone(&store), Arc::clone(&sink));
                async move {
                    RosterLedger::load(user_id, policy, store, sink)
                        .await
                        .map(RosterLedger::into_roster)
                }
            })
            .await?;

        let mut ledger = RosterLedger::new(roster, policy, store, sink);
        ledger.replenish_if_expired(Utc::now()).await;
        Ok(ledger)
    }

    /// Marks a user as questing. Returns `None` if they already are.
    ///
    /// The mark is cleared when the returned guard is dropped.
    pub fn begin_quest(&self, user_id: u64) -> Option<QuestGuard<'_>> {
        let inserted = self
            .questing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id);
        inserted.then(|| QuestGuard {
            data: self,
            user_id,
        })
    }
}

/// Keeps a user marked as questing while alive.
pub struct QuestGuard<'a> {
    data: &'a BotData,
    user_id: u64,
}

impl Drop for QuestGuard<'_> {
    fn drop(&mut self) {
        self.data
            .questing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

async fn dynamic_prefix(ctx: poise::PartialContext<'_, BotData, Error>) -> Result<Option<String>> {
    ctx.data.prefix_for(ctx.guild_id).await.map(Some)
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!(?error, "Failed to start bot");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().name, ?error, "Error in command");
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!(%e, "Failed to send error message");
            }
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            // Encounter inputs such as `accept` and `roll` arrive here too
            debug!("Ignoring unknown prefix command");
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!(%e, "Error while handling error");
            }
        }
    }
}

/// Builds the framework and runs the client until it stops.
#[instrument(skip_all)]
pub async fn run_bot(token: String, settings: AppConfig, database: DatabaseConnection) -> Result<()> {
    let manual = MonsterManual::from_config(&settings.monsters)?;
    if manual.is_empty() {
        warn!("The monster manual is empty; every quest will fail");
    }
    info!(monsters = manual.len(), "Monster manual loaded");

    let owners = settings
        .bot
        .owner_ids
        .iter()
        .copied()
        .map(serenity::UserId::new)
        .collect();
    let default_prefix = settings.bot.default_prefix.clone();
    let shard_count = settings.bot.shard_count;
    let data = BotData::new(database, settings, manual);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            owners,
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(default_prefix),
                dynamic_prefix: Some(|ctx| Box::pin(dynamic_prefix(ctx))),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::events::event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!(user = %ready.user.name, "Logged in");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Registered commands globally");
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!(%e, "Error creating client"))?;

    info!(?shard_count, "Starting bot client");
    match shard_count {
        Some(shards) => client.start_shards(shards).await?,
        None => client.start_autosharded().await?,
    }
    Ok(())
}
