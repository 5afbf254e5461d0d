//! Passive message handlers.

use crate::context::BotContext;
use crate::error::BotResult;
use crate::member::Member;
use async_trait::async_trait;
use chat_client::ChatMessage;
use std::sync::Arc;

/// A non-command message inspector.
///
/// Handlers run in name order on every non-command message in their context;
/// the first one that consumes the message stops the iteration.
#[async_trait]
pub trait PassiveHandler: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Inspect the message. Returning true consumes it and suppresses any
    /// later handlers.
    async fn run(
        &self,
        context: &Arc<BotContext>,
        member: &Member,
        message: &ChatMessage,
    ) -> BotResult<bool>;
}
