//! Forces a user's permission level, bypassing the setperms rank guards.

use crate::command::{ArchonCommand, Invocation};
use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::users;
use async_trait::async_trait;
use chat_client::Gateway;
use std::sync::Arc;
use tracing::info;

pub struct ArchonForcePerms;

#[async_trait]
impl ArchonCommand for ArchonForcePerms {
    fn name(&self) -> &str {
        "forceperms"
    }

    fn description(&self) -> &str {
        "Forces the permission level of a given user."
    }

    fn syntax(&self) -> String {
        format!("{} <userId> <permLvl>", self.name())
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        if invocation.args.len() != 2 {
            return Err(BotError::command(self.name(), "Expected 2 args."));
        }
        let level: u8 = invocation.args[1].parse().map_err(|_| {
            BotError::command(
                self.name(),
                format!("Invalid permission level `{}`.", invocation.args[1]),
            )
        })?;

        match invocation.context {
            Some(context) => {
                self.set_in_context(invocation, context, &invocation.args[0], level)
                    .await
            }
            None => {
                // Console invocations have no context, so the level is
                // forced in every user-defined context.
                info!(
                    target: "console",
                    "No context is present; updating the permission level in all non-fallback contexts."
                );
                for context in invocation.bot.contexts().all() {
                    if !context.is_fallback() {
                        self.set_in_context(invocation, &context, &invocation.args[0], level)
                            .await?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl ArchonForcePerms {
    async fn set_in_context(
        &self,
        invocation: &Invocation<'_>,
        context: &Arc<BotContext>,
        query: &str,
        level: u8,
    ) -> BotResult<()> {
        let target = users::find_member_by_id(invocation.bot.gateway(), context, query)
            .await?
            .ok_or_else(|| BotError::command(self.name(), "Invalid user."))?;
        if target.id() == invocation.bot.gateway().current_user().id {
            return Err(BotError::command(
                self.name(),
                "My permission level is immutable and cannot be changed from 255.",
            ));
        }
        invocation
            .bot
            .perms()
            .set_level(context, target.id(), level, true)
            .await
    }
}
