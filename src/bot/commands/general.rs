//! General Discord commands - ping and help.
//! These commands don't touch the database and provide basic bot functionality.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Explains the quest game and lists every command.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefix = ctx.data().prefix_for(ctx.guild_id()).await?;
        ctx.say(super::help_text(&prefix)).await?;
        Ok(())
    }
}

pub use inner::*;

fn help_text(p: &str) -> String {
    format!(
        "**Realms Help**\n\
        Collect characters and take them on monster quests.\n\n\
        **Roster Commands**\n\
        • `{p}recruit` - Recruits a random character (uses one quest roll).\n\
        • `{p}characters [page]` - Lists your characters, ten per page.\n\
        • `{p}dump <id>` - Releases a character from your roster.\n\
        • `{p}rolls` - Shows your remaining quest rolls and cooldown.\n\n\
        **Quests**\n\
        • `{p}quest [ids...]` - Starts a quest with the named characters, or your first four.\n\
        While on a quest, answer with `{p}accept <n>`, `{p}roll 1d20`, \
        `{p}stack <card#> <amount>` and `{p}attack`.\n\n\
        **Utility Commands**\n\
        • `{p}prefix <new>` - Changes this server's prefix (Manage Server).\n\
        • `{p}ping` - Checks if the bot is responsive.\n\
        • `{p}help` - Shows this help message."
    )
}
