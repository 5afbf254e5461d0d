//! Platform gateway abstraction.

use crate::error::GatewayError;
use crate::types::{ChannelId, ChatMessage, ChatUser, ServerId, UserId};
use async_trait::async_trait;

/// Connection to the chat platform.
///
/// The real network client lives outside this workspace; the bot only needs
/// the handful of calls below. [`crate::MemoryGateway`] implements them
/// in-process for tests and local runs.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// The account the bot is signed in as.
    fn current_user(&self) -> &ChatUser;

    /// Reply in the channel the message arrived in.
    async fn reply(&self, message: &ChatMessage, text: &str) -> Result<(), GatewayError>;

    /// Send to a specific channel.
    async fn send(&self, channel: ChannelId, text: &str) -> Result<(), GatewayError>;

    /// All members of a server, as currently known.
    async fn members_of(&self, server: ServerId) -> Result<Vec<ChatUser>, GatewayError>;

    /// Look a user up by id, regardless of server membership.
    async fn user_by_id(&self, id: UserId) -> Result<Option<ChatUser>, GatewayError>;
}
