//! Gateway event handler: wires ready, reaction, and message events into
//! the scheduler and coordinator.

use std::sync::Arc;

use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use tracing::{error, info, warn};

use super::commands;
use crate::checkin::coordinator::Coordinator;
use crate::checkin::schedule::Scheduler;
use crate::platform::ReactionEvent;

pub struct Handler {
    pub coordinator: Arc<Coordinator>,
    pub scheduler: Arc<Scheduler>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            user_id = ready.user.id.get(),
            "logged in"
        );

        self.coordinator.set_identity(ready.user.id);

        // Gateway reconnects re-deliver ready; start() is a no-op then.
        self.scheduler.start();
        if self.scheduler.is_running() {
            info!("daily check-in task is confirmed as running");
        } else {
            warn!("daily check-in task did not confirm as running after start");
        }
    }

    async fn reaction_add(&self, _ctx: Context, added: Reaction) {
        // Raw gateway payloads can omit the reacting user.
        let Some(user_id) = added.user_id else {
            return;
        };

        let event = ReactionEvent {
            user_id,
            channel_id: added.channel_id,
            message_id: added.message_id,
            emoji: added.emoji.to_string(),
        };

        // Outcome-level logging lives in the coordinator; only failures
        // surface here.
        if let Err(e) = self.coordinator.handle_reaction_added(event).await {
            error!(error = %e, "reaction handling failed");
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        commands::dispatch(&ctx, &msg, &self.scheduler).await;
    }
}
