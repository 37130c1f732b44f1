//! Gateway event handler - logs shard lifecycle and guild membership.

use crate::{bot::BotData, errors::Error};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Handles gateway events the framework passes through.
pub async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                user = %data_about_bot.user.name,
                shard = ?data_about_bot.shard,
                guilds = data_about_bot.guilds.len(),
                "Shard connected"
            );
        }
        serenity::FullEvent::ShardStageUpdate { event } => {
            info!(
                shard = ?event.shard_id,
                old = ?event.old,
                new = ?event.new,
                "Shard stage changed"
            );
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            if incomplete.unavailable {
                warn!(guild_id = %incomplete.id, "Guild became unavailable");
            } else {
                data.prefixes.invalidate(&incomplete.id.get()).await;
                info!(guild_id = %incomplete.id, "Removed from guild");
            }
        }
        _ => {}
    }
    Ok(())
}
