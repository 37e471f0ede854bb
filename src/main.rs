use std::sync::Arc;

use serenity::client::Client;
use serenity::http::Http;
use serenity::model::gateway::GatewayIntents;
use thiserror::Error;

use crate::bot::handler::Handler;
use crate::checkin::coordinator::Coordinator;
use crate::checkin::schedule::Scheduler;
use crate::platform::discord::DiscordPlatform;
use crate::util::env::{Env, EnvErr};

mod bot;
mod checkin;
mod constants;
mod platform;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Env(#[from] EnvErr),

    #[error(transparent)]
    Serenity(#[from] serenity::Error),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    util::telemetry::init();

    tracing::info!(
        service = util::telemetry::SERVICE_NAME,
        "starting main application"
    );

    let env = Env::new()?;
    if env.check_in_channel_id == 0 {
        tracing::warn!("CHECK_IN_CHANNEL_ID is not set; check-in sends will fail until it is");
    }

    let http = Arc::new(Http::new(&env.discord_token));
    let platform = Arc::new(DiscordPlatform::new(http));
    let coordinator = Arc::new(Coordinator::new(platform, env.check_in_channel_id));
    let scheduler = Arc::new(Scheduler::new(env.check_in_time, Arc::clone(&coordinator)));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let mut client = Client::builder(&env.discord_token, intents)
        .event_handler(Handler {
            coordinator,
            scheduler,
        })
        .await?;

    client.start().await?;
    Ok(())
}
