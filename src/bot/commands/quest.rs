//! The quest command - runs a full encounter in the invoking channel.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, channel::DiscordChannel, commands::roster::quota_message},
        core::{character::Party, encounter::Encounter},
        errors::{Error, Result},
    };
    use rand::{SeedableRng, rngs::StdRng};
    use tracing::info;

    /// Takes your characters on a monster quest.
    ///
    /// Name character ids to choose the party, or leave them out to field your first characters.
    #[poise::command(slash_command, prefix_command)]
    pub async fn quest(
        ctx: poise::Context<'_, BotData, Error>,
        #[rest]
        #[description = "Character ids to take along, separated by spaces"]
        characters: Option<String>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.get();
        let prefix = data.prefix_for(ctx.guild_id()).await?;

        let Ok(ids) = super::parse_ids(characters.as_deref().unwrap_or_default()) else {
            ctx.say(format!("Character ids are numbers, e.g. `{prefix}quest 12 34`."))
                .await?;
            return Ok(());
        };

        let Some(_questing) = data.begin_quest(user_id) else {
            ctx.say("You are already on a quest!").await?;
            return Ok(());
        };

        let mut ledger = data.ledger(user_id).await?;
        if ledger.roster().rolls_left() <= 0 {
            ctx.say(quota_message(ledger.roster())).await?;
            return Ok(());
        }

        let party = match Party::select(
            ledger.roster().characters(),
            &ids,
            data.settings.quests.party_size,
        ) {
            Ok(party) => party,
            Err(Error::EmptyParty) => {
                ctx.say(format!(
                    "You have no characters yet! Recruit one with `{prefix}recruit`."
                ))
                .await?;
                return Ok(());
            }
            Err(Error::CharacterNotFound { id }) => {
                ctx.say(format!("You don't have a character with id `{id}`."))
                    .await?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let names: Vec<&str> = party.characters().iter().map(|c| c.name.as_str()).collect();
        ctx.say(format!(
            "**{}** sets out with {}.",
            ctx.author().name,
            names.join(", ")
        ))
        .await?;

        let channel = DiscordChannel::new(
            ctx.serenity_context(),
            ctx.channel_id(),
            ctx.author().id,
            data.settings.bot.colour,
        );
        let state = Encounter::new(
            channel,
            party,
            &data.manual,
            &mut ledger,
            prefix,
            data.settings.quests.encounter_settings(),
            StdRng::from_os_rng(),
        )
        .run()
        .await?;

        info!(user_id, ?state, "Quest finished");
        Ok(())
    }
}

pub use inner::*;

/// Parses whitespace-separated character ids.
fn parse_ids(input: &str) -> std::result::Result<Vec<u64>, std::num::ParseIntError> {
    input.split_whitespace().map(str::parse).collect()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("").unwrap(), Vec::<u64>::new());
        assert_eq!(parse_ids(" 12  34 ").unwrap(), vec![12, 34]);
        assert!(parse_ids("12 abc").is_err());
        assert!(parse_ids("-1").is_err());
    }
}
