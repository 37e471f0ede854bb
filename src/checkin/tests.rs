use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId, UserId};

use crate::constants::{ALLOWED_REACTION_EMOJI, CHECK_IN_MESSAGE};
use crate::platform::{ChatPlatform, PlatformError, PlatformResult, ReactionEvent};

use super::coordinator::{CheckinError, Coordinator, ReactionOutcome};

/// Which failure a scripted mock call should produce.
#[derive(Debug, Clone, Copy)]
pub enum Fail {
    NotFound,
    Forbidden,
    Transport,
}

impl Fail {
    fn to_err(self) -> PlatformError {
        match self {
            Fail::NotFound => PlatformError::NotFound,
            Fail::Forbidden => PlatformError::Forbidden,
            Fail::Transport => PlatformError::Transport("connection reset".into()),
        }
    }
}

/// Scripted stand-in for the Discord client. Records every outbound call so
/// tests can assert on exactly what the coordinator asked for.
pub struct MockPlatform {
    next_message_id: AtomicU64,
    pub fail_fetch_channel: Option<Fail>,
    pub fail_send: Option<Fail>,
    pub fail_add_reaction: Option<Fail>,
    pub fail_fetch_message: Option<Fail>,
    pub fail_remove_reaction: Option<Fail>,
    pub sent: Mutex<Vec<(ChannelId, String)>>,
    pub added: Mutex<Vec<(MessageId, String)>>,
    pub removed: Mutex<Vec<(MessageId, String, UserId)>>,
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self {
            next_message_id: AtomicU64::new(1000),
            fail_fetch_channel: None,
            fail_send: None,
            fail_add_reaction: None,
            fail_fetch_message: None,
            fail_remove_reaction: None,
            sent: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
            removed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn fetch_channel(&self, _channel_id: ChannelId) -> PlatformResult<String> {
        match self.fail_fetch_channel {
            Some(fail) => Err(fail.to_err()),
            None => Ok("daily-check-in".to_owned()),
        }
    }

    async fn send_message(&self, channel_id: ChannelId, text: &str) -> PlatformResult<MessageId> {
        if let Some(fail) = self.fail_send {
            return Err(fail.to_err());
        }

        let id = MessageId::new(self.next_message_id.fetch_add(1, Ordering::SeqCst));
        self.sent.lock().unwrap().push((channel_id, text.to_owned()));
        Ok(id)
    }

    async fn add_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        if let Some(fail) = self.fail_add_reaction {
            return Err(fail.to_err());
        }

        self.added.lock().unwrap().push((message_id, emoji.to_owned()));
        Ok(())
    }

    async fn fetch_message(
        &self,
        _channel_id: ChannelId,
        _message_id: MessageId,
    ) -> PlatformResult<()> {
        match self.fail_fetch_message {
            Some(fail) => Err(fail.to_err()),
            None => Ok(()),
        }
    }

    async fn remove_reaction(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        user_id: UserId,
        emoji: &str,
    ) -> PlatformResult<()> {
        if let Some(fail) = self.fail_remove_reaction {
            return Err(fail.to_err());
        }

        self.removed
            .lock()
            .unwrap()
            .push((message_id, emoji.to_owned(), user_id));
        Ok(())
    }
}

const CHANNEL: u64 = 42;

fn coordinator_with(platform: MockPlatform) -> (Arc<MockPlatform>, Coordinator) {
    let platform = Arc::new(platform);
    let coordinator = Coordinator::new(platform.clone(), CHANNEL);
    (platform, coordinator)
}

fn reaction(user: u64, channel: u64, message: MessageId, emoji: &str) -> ReactionEvent {
    ReactionEvent {
        user_id: UserId::new(user),
        channel_id: ChannelId::new(channel),
        message_id: message,
        emoji: emoji.to_owned(),
    }
}

#[tokio::test]
async fn send_records_id_and_self_reacts() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());

    coordinator.send_daily_check_in().await.unwrap();

    let message_id = coordinator.last_message_id().await.unwrap();
    let sent = platform.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], (ChannelId::new(CHANNEL), CHECK_IN_MESSAGE.to_owned()));

    let added = platform.added.lock().unwrap();
    assert_eq!(*added, vec![(message_id, ALLOWED_REACTION_EMOJI.to_owned())]);
}

#[tokio::test]
async fn resend_overwrites_recorded_id() {
    let (_, coordinator) = coordinator_with(MockPlatform::default());

    coordinator.send_daily_check_in().await.unwrap();
    let first = coordinator.last_message_id().await.unwrap();

    coordinator.send_daily_check_in().await.unwrap();
    let second = coordinator.last_message_id().await.unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn unset_channel_is_a_configuration_error() {
    let platform = Arc::new(MockPlatform::default());
    let coordinator = Coordinator::new(platform.clone(), 0);

    let err = coordinator.send_daily_check_in().await.unwrap_err();
    assert!(matches!(err, CheckinError::ChannelUnset));
    assert!(platform.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unresolvable_channel_stops_the_send() {
    let (platform, coordinator) = coordinator_with(MockPlatform {
        fail_fetch_channel: Some(Fail::NotFound),
        ..MockPlatform::default()
    });

    let err = coordinator.send_daily_check_in().await.unwrap_err();
    assert!(matches!(err, CheckinError::ChannelNotFound(CHANNEL)));
    assert!(platform.sent.lock().unwrap().is_empty());
    assert!(coordinator.last_message_id().await.is_none());
}

#[tokio::test]
async fn transport_failure_on_send_is_reported() {
    let (platform, coordinator) = coordinator_with(MockPlatform {
        fail_send: Some(Fail::Transport),
        ..MockPlatform::default()
    });

    let err = coordinator.send_daily_check_in().await.unwrap_err();
    assert!(matches!(err, CheckinError::Transport { .. }));
    assert!(coordinator.last_message_id().await.is_none());
    assert!(platform.added.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reaction_add_failure_keeps_the_recorded_id() {
    let (_, coordinator) = coordinator_with(MockPlatform {
        fail_add_reaction: Some(Fail::Forbidden),
        ..MockPlatform::default()
    });

    let err = coordinator.send_daily_check_in().await.unwrap_err();
    assert!(matches!(err, CheckinError::Permission { .. }));
    // The message went out; its id stays recorded.
    assert!(coordinator.last_message_id().await.is_some());
}

#[tokio::test]
async fn own_reactions_are_ignored() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());
    coordinator.set_identity(UserId::new(7));
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    // Even a disallowed emoji from the bot itself triggers nothing.
    let outcome = coordinator
        .handle_reaction_added(reaction(7, CHANNEL, message_id, "🔥"))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Ignored);
    assert!(platform.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reactions_before_any_send_are_ignored() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());

    let outcome = coordinator
        .handle_reaction_added(reaction(
            9,
            CHANNEL,
            MessageId::new(555),
            ALLOWED_REACTION_EMOJI,
        ))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Ignored);
    assert!(platform.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reactions_on_other_messages_are_ignored() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    let other = MessageId::new(message_id.get() + 999);
    let outcome = coordinator
        .handle_reaction_added(reaction(9, CHANNEL, other, ALLOWED_REACTION_EMOJI))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Ignored);
    assert_eq!(coordinator.responded_count().await, 0);
    assert!(platform.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reactions_in_other_channels_are_ignored() {
    let (_, coordinator) = coordinator_with(MockPlatform::default());
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    let outcome = coordinator
        .handle_reaction_added(reaction(9, CHANNEL + 1, message_id, ALLOWED_REACTION_EMOJI))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Ignored);
}

#[tokio::test]
async fn approved_reaction_is_recorded() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    let outcome = coordinator
        .handle_reaction_added(reaction(9, CHANNEL, message_id, ALLOWED_REACTION_EMOJI))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Accepted);
    assert_eq!(coordinator.responded_count().await, 1);
    assert!(platform.removed.lock().unwrap().is_empty());

    // Re-adding after a strip is a fresh accept, evaluated independently.
    let again = coordinator
        .handle_reaction_added(reaction(9, CHANNEL, message_id, ALLOWED_REACTION_EMOJI))
        .await
        .unwrap();
    assert_eq!(again, ReactionOutcome::Accepted);
    assert_eq!(coordinator.responded_count().await, 1);
}

#[tokio::test]
async fn disallowed_reaction_is_stripped() {
    let (platform, coordinator) = coordinator_with(MockPlatform::default());
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    let outcome = coordinator
        .handle_reaction_added(reaction(9, CHANNEL, message_id, "🔥"))
        .await
        .unwrap();

    assert_eq!(outcome, ReactionOutcome::Removed);
    let removed = platform.removed.lock().unwrap();
    assert_eq!(*removed, vec![(message_id, "🔥".to_owned(), UserId::new(9))]);
    assert_eq!(coordinator.responded_count().await, 0);
}

#[tokio::test]
async fn strip_without_manage_messages_reports_permission() {
    let (platform, coordinator) = coordinator_with(MockPlatform {
        fail_remove_reaction: Some(Fail::Forbidden),
        ..MockPlatform::default()
    });
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    let err = coordinator
        .handle_reaction_added(reaction(9, CHANNEL, message_id, "🔥"))
        .await
        .unwrap_err();

    assert!(matches!(err, CheckinError::Permission { .. }));
    assert!(platform.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn strip_on_vanished_message_is_reported_and_dropped() {
    let (platform, coordinator) = coordinator_with(MockPlatform {
        fail_fetch_message: Some(Fail::NotFound),
        ..MockPlatform::default()
    });
    coordinator.send_daily_check_in().await.unwrap();
    let message_id = coordinator.last_message_id().await.unwrap();

    // Not an error: the message is simply gone.
    coordinator
        .handle_reaction_added(reaction(9, CHANNEL, message_id, "🔥"))
        .await
        .unwrap();

    assert!(platform.removed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn manual_trigger_sends_without_a_running_scheduler() {
    use super::schedule::Scheduler;
    use chrono::NaiveTime;

    let platform = Arc::new(MockPlatform::default());
    let coordinator = Arc::new(Coordinator::new(platform.clone(), CHANNEL));
    let scheduler = Scheduler::new(NaiveTime::from_hms_opt(7, 0, 0).unwrap(), coordinator.clone());

    assert!(!scheduler.is_running());
    scheduler.invoke_now().await.unwrap();

    assert!(coordinator.last_message_id().await.is_some());
    assert_eq!(platform.sent.lock().unwrap().len(), 1);
}
