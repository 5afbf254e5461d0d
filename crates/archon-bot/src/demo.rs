//! Demo server context, the shape a host application registers.

use async_trait::async_trait;
use bot_core::perms::LEVEL_STANDARD;
use bot_core::{BotContext, BotResult, Command, Invocation, Member, PassiveHandler};
use chat_client::{ChatMessage, Gateway, ServerId};
use std::sync::Arc;

/// Server id the demo context binds to.
pub const DEMO_SERVER: ServerId = ServerId(100);

/// Greets whoever runs it.
struct SayHello;

#[async_trait]
impl Command for SayHello {
    fn name(&self) -> &str {
        "sayhello"
    }

    fn description(&self) -> &str {
        "Makes the bot say hello."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let greeting = match invocation.member {
            Some(member) => format!("Hello, {}", member.mention()),
            None => "Hello from the console!".to_string(),
        };
        invocation.respond(&greeting).await
    }
}

/// Answers "ping" with "pong" and consumes the message.
struct PingResponder {
    gateway: Arc<dyn Gateway>,
}

#[async_trait]
impl PassiveHandler for PingResponder {
    fn name(&self) -> &str {
        "Ping Responder"
    }

    fn description(&self) -> &str {
        "Replies to messages consisting of the word ping."
    }

    async fn run(
        &self,
        _context: &Arc<BotContext>,
        _member: &Member,
        message: &ChatMessage,
    ) -> BotResult<bool> {
        if message.content.trim().eq_ignore_ascii_case("ping") {
            self.gateway.reply(message, "pong").await?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// The demo context: one context command, one passive handler.
pub fn demo_context(gateway: Arc<dyn Gateway>) -> BotContext {
    BotContext::builder("Demo Server", DEMO_SERVER)
        .storage_name("ctx-demo")
        .command(Arc::new(SayHello))
        .handler(Arc::new(PingResponder { gateway }))
        .build()
}
