//! Guild prefix command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::guild,
        errors::{Error, Result},
    };

    /// Changes the command prefix for this server.
    #[poise::command(
        slash_command,
        prefix_command,
        guild_only,
        required_permissions = "MANAGE_GUILD"
    )]
    pub async fn prefix(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The new prefix, up to 5 characters"] new_prefix: String,
    ) -> Result<()> {
        let Some(guild_id) = ctx.guild_id() else {
            return Ok(());
        };
        let data = ctx.data();

        let reply = match guild::set_prefix(&data.database, guild_id.get(), &new_prefix).await {
            Ok(prefix) => {
                data.prefixes.insert(guild_id.get(), prefix.clone()).await;
                format!("Prefix set to `{prefix}`.")
            }
            Err(e @ Error::InvalidPrefix { .. }) => e.to_string(),
            Err(e) => return Err(e),
        };
        ctx.say(reply).await?;
        Ok(())
    }
}

pub use inner::*;
