//! Roster commands - listing, recruiting, releasing characters, and the quest quota.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::character::Character,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use rand::{SeedableRng, rngs::StdRng};

    /// Lists your characters, ten per page.
    #[poise::command(slash_command, prefix_command)]
    pub async fn characters(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Page number (default: 1)"] page: Option<usize>,
    ) -> Result<()> {
        let data = ctx.data();
        let ledger = data.ledger(ctx.author().id.get()).await?;
        let roster = ledger.roster();

        let Some((page, listing)) = super::page_listing(roster, page.unwrap_or(1)) else {
            let prefix = data.prefix_for(ctx.guild_id()).await?;
            ctx.say(format!(
                "You have no characters yet! Recruit one with `{prefix}recruit`."
            ))
            .await?;
            return Ok(());
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!("{}'s characters", ctx.author().name))
            .description(listing)
            .colour(data.settings.bot.colour)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "Page {page}/{} | {} character{}",
                roster.page_count(),
                roster.amount_of_items(),
                if roster.amount_of_items() == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Recruits a random character to your roster. Uses one quest roll.
    #[poise::command(slash_command, prefix_command)]
    pub async fn recruit(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let mut ledger = data.ledger(ctx.author().id.get()).await?;
        if ledger.roster().rolls_left() <= 0 {
            ctx.say(super::quota_message(ledger.roster())).await?;
            return Ok(());
        }

        let recruit = {
            let mut rng = StdRng::from_os_rng();
            Character::recruit(&data.settings.recruits.names, &mut rng)
        };
        let Some(character) = recruit else {
            ctx.say("There is nobody to recruit right now.").await?;
            return Ok(());
        };

        ledger.submit_character(character.clone()).await?;
        ledger.update_rolls(-1).await;

        ctx.say(format!(
            "🎉 **{character}** joined your roster! Their id is `{}`.",
            character.id
        ))
        .await?;
        Ok(())
    }

    /// Releases a character from your roster.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dump(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Id of the character to release"] id: u64,
    ) -> Result<()> {
        let mut ledger = ctx.data().ledger(ctx.author().id.get()).await?;
        let reply = match ledger.dump_character(id).await {
            Ok(character) => format!("👋 **{character}** has left your roster."),
            Err(Error::CharacterNotFound { id }) => {
                format!("You don't have a character with id `{id}`.")
            }
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }

    /// Shows how many quests you have left and when they come back.
    #[poise::command(slash_command, prefix_command)]
    pub async fn rolls(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let ledger = ctx.data().ledger(ctx.author().id.get()).await?;
        ctx.say(super::quota_message(ledger.roster())).await?;
        Ok(())
    }
}

pub use inner::*;

use crate::core::roster::Roster;
use chrono::{DateTime, Utc};

/// Describes the remaining quest rolls, or the cooldown once they are spent.
pub(crate) fn quota_message(roster: &Roster) -> String {
    quota_message_at(roster, Utc::now())
}

fn quota_message_at(roster: &Roster, now: DateTime<Utc>) -> String {
    match roster.expires_in_at(now) {
        Some(wait) if roster.rolls_left() <= 0 => {
            format!("You have no quests left! They come back in **{wait}**.")
        }
        _ => format!("You have **{}** quests left.", roster.rolls_left().max(0)),
    }
}

/// The requested roster page, clamped to the pages that exist, as one line per character.
///
/// `None` when the roster is empty.
fn page_listing(roster: &Roster, page: usize) -> Option<(usize, String)> {
    let page = page.clamp(1, roster.page_count().max(1));
    let block = roster.blocks().nth(page - 1)?;
    let listing = block
        .iter()
        .map(|c| format!("`{}` {c}", c.id))
        .collect::<Vec<_>>()
        .join("\n");
    Some((page, listing))
}
