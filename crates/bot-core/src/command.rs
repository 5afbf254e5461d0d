//! Command descriptors and the data an execution can see.

use crate::bot::Bot;
use crate::context::BotContext;
use crate::error::BotResult;
use crate::member::Member;
use async_trait::async_trait;
use chat_client::{ChannelId, ChatMessage, Gateway};
use std::sync::Arc;
use tracing::info;

/// Transient result of a permission check. Never persisted.
#[derive(Debug, Clone)]
pub struct UsagePermission {
    pub allowed: bool,
    /// The message shown to the invoker when `allowed` is false.
    pub denial_reason: Option<String>,
}

impl UsagePermission {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            denial_reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            denial_reason: Some(reason.into()),
        }
    }
}

/// Result of a channel eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCheck {
    Allowed,
    /// The command is unsuitable here; the named channel should be used.
    Redirect(ChannelId),
}

/// A runnable chat command.
#[async_trait]
pub trait Command: Send + Sync {
    /// Canonical name, compared case-insensitively. Lowercase, no spaces.
    fn name(&self) -> &str;

    /// Alternate names that also resolve to this command.
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Description shown by the stock help command.
    fn description(&self) -> &str;

    /// Usage syntax shown by the stock help command.
    fn syntax(&self) -> String;

    /// Minimum permission level required to run this command.
    fn required_level(&self) -> u8;

    /// Whether a member at `level` may use this command.
    fn usage_for(&self, level: u8) -> UsagePermission {
        if level >= self.required_level() {
            UsagePermission::allow()
        } else {
            UsagePermission::deny(format!(
                "You are not authorized to use `{}`. It is only available to `{}` and above (You are at `{}`).",
                self.name(),
                self.required_level(),
                level
            ))
        }
    }

    /// Channel eligibility for the message's channel.
    fn channel_check(&self, _message: &ChatMessage) -> ChannelCheck {
        ChannelCheck::Allowed
    }

    /// Run the command. Authorization has already happened.
    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()>;
}

/// High-privilege nested commands dispatched through `archoncmd`.
#[async_trait]
pub trait ArchonCommand: Send + Sync {
    /// Name, compared case-insensitively. Lowercase, no spaces.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn syntax(&self) -> String;

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()>;
}

/// Everything one command execution can see.
///
/// Console-origin invocations carry no context, member, or message; commands
/// that need one return a "not available from the console" error instead of
/// assuming their presence.
pub struct Invocation<'a> {
    pub context: Option<&'a Arc<BotContext>>,
    pub member: Option<&'a Member>,
    pub message: Option<&'a ChatMessage>,
    /// Parsed argument tokens, command name excluded.
    pub args: &'a [String],
    /// Raw text after the command name, original quoting preserved.
    pub arg_tail: &'a str,
    pub bot: &'a Bot,
}

impl Invocation<'_> {
    /// Reply to whoever invoked the command. Chat-origin invocations reply in
    /// the message's channel; console-origin ones go to the process log.
    pub async fn respond(&self, text: &str) -> BotResult<()> {
        match self.message {
            Some(message) => self
                .bot
                .gateway()
                .reply(message, text)
                .await
                .map_err(Into::into),
            None => {
                info!(target: "console", "{text}");
                Ok(())
            }
        }
    }

    /// The invoking user's permission level; console invocations rank as the
    /// console level.
    pub async fn sender_level(&self) -> BotResult<u8> {
        match self.member {
            Some(member) => {
                self.bot
                    .perms()
                    .level(member.context(), member.id())
                    .await
            }
            None => Ok(crate::perms::LEVEL_CONSOLE),
        }
    }
}
