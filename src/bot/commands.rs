//! Prefix command surface: a manual trigger and a schedule diagnostic.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serenity::client::Context;
use serenity::model::channel::Message;
use tracing::{error, info};

use crate::checkin::schedule::Scheduler;
use crate::constants::{COMMAND_CHECK_TIME, COMMAND_PREFIX, COMMAND_SEND_NOW};

pub async fn dispatch(ctx: &Context, msg: &Message, scheduler: &Arc<Scheduler>) {
    let Some(command) = msg.content.strip_prefix(COMMAND_PREFIX) else {
        return;
    };

    match command.trim() {
        COMMAND_SEND_NOW => send_checkin_now(ctx, msg, scheduler).await,
        COMMAND_CHECK_TIME => check_time(ctx, msg, scheduler).await,
        _ => {}
    }
}

/// `!send_checkin_now` — runs the daily send immediately, schedule or not.
async fn send_checkin_now(ctx: &Context, msg: &Message, scheduler: &Arc<Scheduler>) {
    info!(
        user = %msg.author.name,
        user_id = msg.author.id.get(),
        "manual check-in trigger invoked"
    );

    reply(ctx, msg, "Manually triggering daily check-in message...").await;

    match scheduler.invoke_now().await {
        Ok(()) => reply(ctx, msg, "Daily check-in message sent!").await,
        Err(e) => {
            error!(error = %e, "manual check-in failed");
            reply(ctx, msg, &format!("Check-in failed: {e}")).await;
        }
    }
}

/// `!check_time` — current UTC time, fire time, and time until the next run.
async fn check_time(ctx: &Context, msg: &Message, scheduler: &Arc<Scheduler>) {
    let report = schedule_report(Utc::now(), scheduler);
    reply(ctx, msg, &report).await;
}

async fn reply(ctx: &Context, msg: &Message, text: &str) {
    if let Err(e) = msg.channel_id.say(&ctx.http, text).await {
        error!(error = %e, channel_id = msg.channel_id.get(), "failed to send command reply");
    }
}

fn schedule_report(now: DateTime<Utc>, scheduler: &Scheduler) -> String {
    let mut report = format!(
        "**Bot's Current UTC Time:** {}\n**Scheduled Check-in Time (UTC):** {}\n",
        now.format("%H:%M:%S UTC"),
        scheduler.fire_time().format("%H:%M:%S UTC"),
    );

    if scheduler.is_running() {
        let next = scheduler.next_fire_time(now);
        let (days, hours, minutes, seconds) = breakdown(next - now);
        report.push_str(&format!(
            "**Next Scheduled Run:** In {days} days, {hours} hours, {minutes} minutes, \
             {seconds} seconds (at {})\n**Daily Check-in Task Status:** Running.",
            next.format("%Y-%m-%d %H:%M:%S UTC"),
        ));
    } else {
        report.push_str("**Daily Check-in Task Status:** Not running.");
    }

    report
}

fn breakdown(delta: TimeDelta) -> (i64, i64, i64, i64) {
    let total = delta.num_seconds();

    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let minutes = total % 3_600 / 60;
    let seconds = total % 60;

    (days, hours, minutes, seconds)
}
