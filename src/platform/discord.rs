//! Serenity-backed [`ChatPlatform`] implementation.

use std::sync::Arc;

use serenity::Error as SerenityError;
use serenity::http::{Http, HttpError};
use serenity::model::channel::{Channel, ReactionType};
use serenity::model::id::{ChannelId, MessageId, UserId};
use tracing::instrument;

use super::{ChatPlatform, PlatformError, PlatformResult};

pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl ChatPlatform for DiscordPlatform {
    #[instrument(skip(self))]
    async fn fetch_channel(&self, channel_id: ChannelId) -> PlatformResult<String> {
        let channel = self
            .http
            .get_channel(channel_id)
            .await
            .map_err(map_serenity_err)?;

        let name = match channel {
            Channel::Guild(guild_channel) => guild_channel.name,
            Channel::Private(private_channel) => private_channel.name(),
            _ => channel_id.to_string(),
        };

        Ok(name)
    }

    #[instrument(skip(self, text))]
    async fn send_message(&self, channel_id: ChannelId, text: &str) -> PlatformResult<MessageId> {
        let message = channel_id
            .say(&self.http, text)
            .await
            .map_err(map_serenity_err)?;

        Ok(message.id)
    }

    #[instrument(skip(self))]
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.http
            .create_reaction(channel_id, message_id, &parse_emoji(emoji)?)
            .await
            .map_err(map_serenity_err)
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()> {
        self.http
            .get_message(channel_id, message_id)
            .await
            .map(|_| ())
            .map_err(map_serenity_err)
    }

    #[instrument(skip(self))]
    async fn remove_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.http
            .delete_reaction(channel_id, message_id, user_id, &parse_emoji(emoji)?)
            .await
            .map_err(map_serenity_err)
    }
}

/// Rebuild a [`ReactionType`] from its display form. Handles both plain
/// unicode glyphs and the `<:name:id>` custom-emoji form.
fn parse_emoji(emoji: &str) -> PlatformResult<ReactionType> {
    ReactionType::try_from(emoji)
        .map_err(|_| PlatformError::Transport(format!("unparseable emoji '{emoji}'")))
}

/// Collapse serenity's error surface into the coordinator's taxonomy. Only
/// the REST status codes matter here; everything else is transport.
fn map_serenity_err(err: SerenityError) -> PlatformError {
    match err {
        SerenityError::Http(HttpError::UnsuccessfulRequest(response)) => {
            match response.status_code.as_u16() {
                403 => PlatformError::Forbidden,
                404 => PlatformError::NotFound,
                _ => PlatformError::Transport(response.error.message),
            }
        }
        other => PlatformError::Transport(other.to_string()),
    }
}
