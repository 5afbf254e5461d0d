//! In-process gateway for tests and local runs.

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::types::{ChannelId, ChatMessage, ChatUser, ServerId, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

/// A gateway that never touches the network.
///
/// Messages are injected with [`MemoryGateway::push_message`] and come back
/// out of [`MemoryGateway::messages`]; everything the bot sends is recorded
/// and can be inspected with [`MemoryGateway::sent`].
pub struct MemoryGateway {
    bot: ChatUser,
    rosters: Mutex<HashMap<ServerId, Vec<ChatUser>>>,
    outbox: Mutex<Vec<(ChannelId, String)>>,
    feed_tx: mpsc::UnboundedSender<ChatMessage>,
    feed_rx: Mutex<Option<mpsc::UnboundedReceiver<ChatMessage>>>,
}

impl MemoryGateway {
    pub fn new(bot: ChatUser) -> Self {
        let (feed_tx, feed_rx) = mpsc::unbounded_channel();
        Self {
            bot,
            rosters: Mutex::new(HashMap::new()),
            outbox: Mutex::new(Vec::new()),
            feed_tx,
            feed_rx: Mutex::new(Some(feed_rx)),
        }
    }

    /// Add a user to a server's roster.
    pub fn add_member(&self, server: ServerId, user: ChatUser) {
        self.rosters
            .lock()
            .expect("roster lock poisoned")
            .entry(server)
            .or_default()
            .push(user);
    }

    /// Inject an inbound message into the feed.
    pub fn push_message(
        &self,
        server: ServerId,
        channel: ChannelId,
        author: ChatUser,
        content: impl Into<String>,
    ) {
        let message = ChatMessage {
            author,
            server_id: Some(server),
            channel_id: channel,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        // Receiver gone means the host loop stopped; nothing left to deliver to.
        let _ = self.feed_tx.send(message);
    }

    /// The inbound message stream. May be taken once.
    ///
    /// # Panics
    /// Panics if called a second time.
    pub fn messages(&self) -> UnboundedReceiverStream<ChatMessage> {
        let rx = self
            .feed_rx
            .lock()
            .expect("feed lock poisoned")
            .take()
            .expect("message stream already taken");
        UnboundedReceiverStream::new(rx)
    }

    /// Everything sent through this gateway so far.
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.outbox.lock().expect("outbox lock poisoned").clone()
    }

    /// The most recent outbound text, if any.
    pub fn last_sent(&self) -> Option<String> {
        self.outbox
            .lock()
            .expect("outbox lock poisoned")
            .last()
            .map(|(_, text)| text.clone())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    fn current_user(&self) -> &ChatUser {
        &self.bot
    }

    async fn reply(&self, message: &ChatMessage, text: &str) -> Result<(), GatewayError> {
        self.send(message.channel_id, text).await
    }

    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), GatewayError> {
        debug!("Sending to channel {}: {}", channel, text);
        self.outbox
            .lock()
            .expect("outbox lock poisoned")
            .push((channel, text.to_string()));
        Ok(())
    }

    async fn members_of(&self, server: ServerId) -> Result<Vec<ChatUser>, GatewayError> {
        Ok(self
            .rosters
            .lock()
            .expect("roster lock poisoned")
            .get(&server)
            .cloned()
            .unwrap_or_default())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<ChatUser>, GatewayError> {
        if id == self.bot.id {
            return Ok(Some(self.bot.clone()));
        }
        let rosters = self.rosters.lock().expect("roster lock poisoned");
        Ok(rosters
            .values()
            .flatten()
            .find(|user| user.id == id)
            .cloned())
    }
}
