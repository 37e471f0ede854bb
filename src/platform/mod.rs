//! Seam between the check-in logic and the messaging platform.
//!
//! Everything the coordinator needs from Discord goes through
//! [`ChatPlatform`], so tests can swap in a scripted mock the same way the
//! real client plugs in.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId, UserId};
use thiserror::Error;

pub mod discord;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("channel or message not found")]
    NotFound,

    #[error("missing permission")]
    Forbidden,

    #[error("transport failure: {0}")]
    Transport(String),
}

pub type PlatformResult<T> = core::result::Result<T, PlatformError>;

/// A reaction-added gateway event, reduced to the fields the coordinator
/// inspects. `emoji` is the display form of the reaction (the glyph for a
/// unicode emoji, `<:name:id>` for a custom one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionEvent {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub emoji: String,
}

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Resolve a channel, returning its name for logging. Fails with
    /// [`PlatformError::NotFound`] when the channel is missing or the bot is
    /// not in the guild.
    async fn fetch_channel(&self, channel_id: ChannelId) -> PlatformResult<String>;

    /// Post `text` to the channel, returning the new message's id.
    async fn send_message(&self, channel_id: ChannelId, text: &str) -> PlatformResult<MessageId>;

    /// Attach a reaction as the bot itself.
    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()>;

    /// Confirm a message still exists.
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> PlatformResult<()>;

    /// Remove one user's instance of one reaction from a message.
    async fn remove_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> PlatformResult<()>;
}
