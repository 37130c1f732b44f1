//! Encounter channel backed by a Discord text channel.
//!
//! Views are sent as messages in the channel the quest was started from; input is the next
//! message the questing user posts there, read from one collector kept open for the whole
//! encounter.

use crate::{
    core::{
        encounter::{EncounterChannel, View, render_text, view::QUEST_FOOTER},
        monsters::Monster,
    },
    errors::Result,
};
use async_trait::async_trait;
use poise::{
    futures_util::{Stream, StreamExt, stream::BoxStream},
    serenity_prelude as serenity,
};
use std::time::Duration;
use tracing::trace;

/// Talks to one user in one channel.
///
/// The user's messages are collected from construction on, so input sent while a view is
/// still being posted is kept for the next wait.
pub struct DiscordChannel<'a> {
    ctx: &'a serenity::Context,
    channel_id: serenity::ChannelId,
    colour: u32,
    messages: BoxStream<'static, serenity::Message>,
}

impl<'a> DiscordChannel<'a> {
    /// Creates a channel for `author_id` in `channel_id`.
    #[must_use]
    pub fn new(
        ctx: &'a serenity::Context,
        channel_id: serenity::ChannelId,
        author_id: serenity::UserId,
        colour: u32,
    ) -> Self {
        let messages = serenity::MessageCollector::new(ctx)
            .author_id(author_id)
            .channel_id(channel_id)
            .stream()
            .boxed();
        Self {
            ctx,
            channel_id,
            colour,
            messages,
        }
    }
}

/// The quest board as an embed: one field per offered monster.
#[must_use]
pub fn quest_embed(prefix: &str, quests: &[Monster], colour: u32) -> serenity::CreateEmbed {
    let fields = quests.iter().enumerate().map(|(i, monster)| {
        (
            format!("{}) - {}", i + 1, monster.format_name()),
            format!(
                "{} HP · initiative {} · hits for {}",
                monster.hit_points, monster.initiative, monster.damage
            ),
            false,
        )
    });

    serenity::CreateEmbed::default()
        .title("Monster Quests!")
        .description(format!(
            "Which quest do you choose? Do `{prefix}accept <quest number>`"
        ))
        .colour(colour)
        .fields(fields)
        .footer(serenity::CreateEmbedFooter::new(QUEST_FOOTER))
}

/// Next item of a long-lived stream, or `None` once `timeout` passes or the stream ends.
///
/// Items that arrived between reads are still queued in the stream.
async fn next_within<S>(stream: &mut S, timeout: Duration) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    tokio::time::timeout(timeout, stream.next()).await.ok().flatten()
}

#[async_trait]
impl<'a> EncounterChannel for DiscordChannel<'a> {
    type Message = serenity::MessageId;

    async fn present(&mut self, view: View<'_>) -> Result<Self::Message> {
        let message = match view {
            View::QuestMenu { prefix, quests } => {
                serenity::CreateMessage::new().embed(quest_embed(prefix, quests, self.colour))
            }
            _ => serenity::CreateMessage::new().content(render_text(&view)),
        };
        let sent = self.channel_id.send_message(self.ctx, message).await?;
        Ok(sent.id)
    }

    async fn retract(&mut self, message: Self::Message) -> Result<()> {
        self.channel_id.delete_message(self.ctx, message).await?;
        Ok(())
    }

    async fn next_input(&mut self, timeout: Duration) -> Result<Option<String>> {
        let message = next_within(&mut self.messages, timeout).await;
        trace!(received = message.is_some(), "Encounter input wait finished");
        Ok(message.map(|m| m.content))
    }
}
