//! The check-in coordinator owns today's check-in state and makes the two
//! decisions that matter: post-and-record the daily message, and gate
//! inbound reactions against it.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use serenity::model::id::{ChannelId, MessageId, UserId};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::constants::{ALLOWED_REACTION_EMOJI, CHECK_IN_MESSAGE};
use crate::platform::{ChatPlatform, PlatformError, ReactionEvent};

#[derive(Debug, Error)]
pub enum CheckinError {
    #[error("CHECK_IN_CHANNEL_ID is not set")]
    ChannelUnset,

    #[error("channel {0} not found; is the bot in the server?")]
    ChannelNotFound(u64),

    #[error("missing permission to {action} in channel {channel}")]
    Permission { action: &'static str, channel: u64 },

    #[error("platform call failed during {action}: {message}")]
    Transport {
        action: &'static str,
        message: String,
    },
}

pub type CheckinResult<T> = core::result::Result<T, CheckinError>;

impl CheckinError {
    fn from_platform(err: PlatformError, action: &'static str, channel: u64) -> Self {
        match err {
            PlatformError::NotFound => Self::ChannelNotFound(channel),
            PlatformError::Forbidden => Self::Permission { action, channel },
            PlatformError::Transport(message) => Self::Transport { action, message },
        }
    }
}

/// What [`Coordinator::handle_reaction_added`] decided to do with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Unrelated to the active check-in message (or from the bot itself).
    Ignored,
    /// Approved symbol on the active message; the check-in was recorded.
    Accepted,
    /// Disallowed symbol on the active message; the reaction was stripped.
    Removed,
}

/// Working memory. Reset to empty on every restart; nothing here persists.
#[derive(Debug, Default)]
pub struct CheckInState {
    pub last_message_id: Option<MessageId>,
    pub responded: HashSet<UserId>,
}

pub struct Coordinator {
    platform: Arc<dyn ChatPlatform>,
    /// Target channel; `0` means unconfigured.
    channel_id: u64,
    state: Mutex<CheckInState>,
    /// The bot's own user id, learned from the `ready` event.
    bot_user_id: OnceLock<UserId>,
}

impl Coordinator {
    pub fn new(platform: Arc<dyn ChatPlatform>, channel_id: u64) -> Self {
        Self {
            platform,
            channel_id,
            state: Mutex::new(CheckInState::default()),
            bot_user_id: OnceLock::new(),
        }
    }

    /// Records the bot's own identity so its reaction echoes can be skipped.
    /// First write wins; reconnects deliver the same id anyway.
    pub fn set_identity(&self, user_id: UserId) {
        let _ = self.bot_user_id.set(user_id);
    }

    pub async fn last_message_id(&self) -> Option<MessageId> {
        self.state.lock().await.last_message_id
    }

    pub async fn responded_count(&self) -> usize {
        self.state.lock().await.responded.len()
    }

    /// Posts the daily prompt, records its id, and self-reacts with the
    /// approved symbol. The only writer of `last_message_id`.
    ///
    /// A failure after the send (reaction-add) is reported but leaves the
    /// recorded id in place; the message did go out.
    #[instrument(skip(self))]
    pub async fn send_daily_check_in(&self) -> CheckinResult<()> {
        if self.channel_id == 0 {
            return Err(CheckinError::ChannelUnset);
        }
        let channel_id = ChannelId::new(self.channel_id);

        let channel_name = self
            .platform
            .fetch_channel(channel_id)
            .await
            .map_err(|e| CheckinError::from_platform(e, "resolve channel", self.channel_id))?;

        // Hold the lock across send + record so a concurrently delivered
        // reaction never reads a half-updated id.
        let message_id = {
            let mut state = self.state.lock().await;

            let message_id = self
                .platform
                .send_message(channel_id, CHECK_IN_MESSAGE)
                .await
                .map_err(|e| CheckinError::from_platform(e, "send message", self.channel_id))?;

            state.last_message_id = Some(message_id);
            message_id
        };

        info!(
            channel = %channel_name,
            channel_id = self.channel_id,
            message_id = message_id.get(),
            "daily check-in message sent"
        );

        self.platform
            .add_reaction(channel_id, message_id, ALLOWED_REACTION_EMOJI)
            .await
            .map_err(|e| CheckinError::from_platform(e, "add reaction", self.channel_id))?;

        Ok(())
    }

    /// Gates one reaction-added event against the active check-in message.
    #[instrument(skip(self, event), fields(user_id = event.user_id.get(), emoji = %event.emoji))]
    pub async fn handle_reaction_added(
        &self,
        event: ReactionEvent,
    ) -> CheckinResult<ReactionOutcome> {
        // The bot's own auto-reaction echoes back through the gateway.
        if self.bot_user_id.get() == Some(&event.user_id) {
            return Ok(ReactionOutcome::Ignored);
        }

        if event.channel_id.get() != self.channel_id {
            return Ok(ReactionOutcome::Ignored);
        }

        let mut state = self.state.lock().await;
        // No send yet (e.g. fresh restart), or a reaction on an older message.
        if state.last_message_id != Some(event.message_id) {
            return Ok(ReactionOutcome::Ignored);
        }

        if event.emoji == ALLOWED_REACTION_EMOJI {
            state.responded.insert(event.user_id);
            info!(
                user_id = event.user_id.get(),
                checked_in_today = state.responded.len(),
                "user checked in with the approved reaction"
            );
            return Ok(ReactionOutcome::Accepted);
        }
        drop(state);

        self.strip_reaction(&event).await?;
        Ok(ReactionOutcome::Removed)
    }

    async fn strip_reaction(&self, event: &ReactionEvent) -> CheckinResult<()> {
        // Confirm the message still exists before touching its reactions.
        match self
            .platform
            .fetch_message(event.channel_id, event.message_id)
            .await
        {
            Ok(()) => {}
            Err(PlatformError::NotFound) => {
                warn!(
                    message_id = event.message_id.get(),
                    "check-in message no longer exists; nothing to strip"
                );
                return Ok(());
            }
            Err(e) => {
                return Err(CheckinError::from_platform(
                    e,
                    "fetch message",
                    self.channel_id,
                ));
            }
        }

        match self
            .platform
            .remove_reaction(
                event.channel_id,
                event.message_id,
                event.user_id,
                &event.emoji,
            )
            .await
        {
            Ok(()) => {
                info!(
                    user_id = event.user_id.get(),
                    emoji = %event.emoji,
                    "removed unauthorized reaction from check-in message"
                );
                Ok(())
            }
            Err(PlatformError::Forbidden) => Err(CheckinError::Permission {
                action: "remove reaction (needs Manage Messages)",
                channel: self.channel_id,
            }),
            Err(PlatformError::NotFound) => {
                // Message or channel disappeared between fetch and remove.
                warn!(
                    message_id = event.message_id.get(),
                    "check-in message vanished before reaction removal"
                );
                Ok(())
            }
            Err(PlatformError::Transport(message)) => Err(CheckinError::Transport {
                action: "remove reaction",
                message,
            }),
        }
    }
}
