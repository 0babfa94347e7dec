//! The chatroom: a shared append log on one variable, observed by polling.
//!
//! Two states: Idle (no session) and Active (username chosen, poll task
//! running). Entering and leaving are purely local; only the poll ticks and
//! `send` touch the network.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use vaas_client::{PatchVariableRequest, VaasClient};

use crate::error::ChatError;
use crate::message::{ChatMessage, decode_log, encode_log, validate_message, validate_username};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

pub struct ChatRoom {
    client: Arc<VaasClient>,
    variable_id: i64,
    poll_interval: Duration,
    session: Option<Session>,
}

struct Session {
    username: String,
    poller: JoinHandle<()>,
    receiver: watch::Receiver<Vec<ChatMessage>>,
}

impl ChatRoom {
    #[must_use]
    pub fn new(client: Arc<VaasClient>, variable_id: i64) -> Self {
        Self {
            client,
            variable_id,
            poll_interval: DEFAULT_POLL_INTERVAL,
            session: None,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Whether a session is active.
    #[must_use]
    pub fn entered(&self) -> bool {
        self.session.is_some()
    }

    /// Enters the chatroom under `username` and starts the poll task. Purely
    /// local: no network call happens until the first tick.
    ///
    /// Must be called from within a tokio runtime.
    pub fn enter(&mut self, username: &str) -> Result<(), ChatError> {
        if self.session.is_some() {
            return Err(ChatError::AlreadyEntered);
        }
        validate_username(username)?;

        let (sender, receiver) = watch::channel(Vec::new());
        let poller = tokio::spawn(poll_loop(
            self.client.clone(),
            self.variable_id,
            self.poll_interval,
            sender,
        ));

        self.session = Some(Session {
            username: username.to_string(),
            poller,
            receiver,
        });
        Ok(())
    }

    /// A receiver that observes every successfully polled message list.
    pub fn messages(&self) -> Result<watch::Receiver<Vec<ChatMessage>>, ChatError> {
        let session = self.session.as_ref().ok_or(ChatError::NotEntered)?;
        Ok(session.receiver.clone())
    }

    /// Appends a message via read-modify-write: fetch the variable, decode the
    /// log, push, re-encode, write back.
    ///
    /// The write carries no version token, so two sends racing between read
    /// and write can lose one append (last writer's copy wins). That matches
    /// the service's update semantics; callers needing stronger guarantees
    /// must serialize their own sends.
    pub async fn send(&self, message: &str) -> Result<(), ChatError> {
        let session = self.session.as_ref().ok_or(ChatError::NotEntered)?;
        validate_message(message)?;

        let variable = self.client.get_variable(self.variable_id).await?;
        let mut messages = decode_log(variable.value.as_ref())?;
        messages.push(ChatMessage {
            message: message.to_string(),
            user: session.username.clone(),
            time: Utc::now().timestamp_millis(),
        });

        self.client
            .update_variable(self.variable_id, PatchVariableRequest {
                value: Some(encode_log(&messages)?),
                ..PatchVariableRequest::default()
            })
            .await?;
        Ok(())
    }

    /// Leaves the chatroom and cancels the poll task. No network call; an
    /// in-flight fetch is not cancelled, its result is simply dropped.
    pub fn leave(&mut self) {
        if let Some(session) = self.session.take() {
            session.poller.abort();
        }
    }
}

impl Drop for ChatRoom {
    fn drop(&mut self) {
        self.leave();
    }
}

async fn poll_loop(
    client: Arc<VaasClient>,
    variable_id: i64,
    poll_interval: Duration,
    sender: watch::Sender<Vec<ChatMessage>>,
) {
    let mut ticks = tokio::time::interval(poll_interval);
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick fires immediately; skip it so the cadence matches the
    // configured interval from the moment of entry.
    ticks.tick().await;

    loop {
        ticks.tick().await;
        match client.get_variable(variable_id).await {
            Ok(variable) => match decode_log(variable.value.as_ref()) {
                Ok(messages) => {
                    // Re-fetching an unchanged log must not wake observers.
                    sender.send_if_modified(|current| {
                        if *current == messages {
                            false
                        } else {
                            *current = messages;
                            true
                        }
                    });
                }
                Err(error) => {
                    tracing::warn!(%error, variable_id, "poll tick decoded no messages");
                }
            },
            // Leave the cached list untouched; the next tick retries anyway.
            Err(error) => {
                tracing::warn!(%error, variable_id, "poll tick failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaas_client::ClientConfig;

    fn idle_room() -> ChatRoom {
        // Unroutable origin: these tests never reach the network.
        let client = VaasClient::new(ClientConfig::new("http://127.0.0.1:1")).unwrap();
        ChatRoom::new(Arc::new(client), 9)
    }

    #[tokio::test]
    async fn send_requires_an_active_session() {
        let room = idle_room();
        assert!(matches!(room.send("hi").await, Err(ChatError::NotEntered)));
    }

    #[tokio::test]
    async fn messages_require_an_active_session() {
        let room = idle_room();
        assert!(matches!(room.messages(), Err(ChatError::NotEntered)));
    }

    #[tokio::test]
    async fn entering_twice_is_rejected() {
        let mut room = idle_room();
        room.enter("alice").unwrap();
        assert!(matches!(room.enter("bob"), Err(ChatError::AlreadyEntered)));
    }

    #[tokio::test]
    async fn enter_validates_the_username_locally() {
        let mut room = idle_room();
        assert!(matches!(room.enter(""), Err(ChatError::EmptyUsername)));
        assert!(!room.entered());
    }

    #[tokio::test]
    async fn leave_returns_to_idle_and_is_idempotent() {
        let mut room = idle_room();
        room.enter("alice").unwrap();
        assert!(room.entered());

        room.leave();
        assert!(!room.entered());
        room.leave();
    }
}
