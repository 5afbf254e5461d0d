//! Chat platform types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique id of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

/// Unique id of a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerId(pub u64);

/// Unique id of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl UserId {
    /// Parse a raw id or a `<@id>` / `<@!id>` mention into a user id.
    pub fn from_query(query: &str) -> Option<UserId> {
        let raw = query
            .strip_prefix("<@!")
            .or_else(|| query.strip_prefix("<@"))
            .and_then(|rest| rest.strip_suffix('>'))
            .unwrap_or(query);
        raw.parse().ok().map(UserId)
    }
}

/// A user account as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatUser {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
}

impl ChatUser {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot: false,
        }
    }

    /// The `<@id>` mention form understood by the platform.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// One inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub author: ChatUser,
    /// Absent for direct messages.
    pub server_id: Option<ServerId>,
    pub channel_id: ChannelId,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}
