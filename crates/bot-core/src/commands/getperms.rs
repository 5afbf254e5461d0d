//! Permission lookup command.

use super::{require_context, require_member};
use crate::command::{Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::perms::LEVEL_STANDARD;
use crate::users;
use async_trait::async_trait;

pub struct GetPermsCommand;

#[async_trait]
impl Command for GetPermsCommand {
    fn name(&self) -> &str {
        "getperms"
    }

    fn description(&self) -> &str {
        "Gets your permission level, or if a user is specified, the permission level of that user."
    }

    fn syntax(&self) -> String {
        format!("{} [username/userId]", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let context = require_context(invocation, self.name())?;

        if invocation.args.is_empty() {
            let member = require_member(invocation, self.name())?;
            let level = invocation.bot.perms().level(context, member.id()).await?;
            return invocation
                .respond(&format!("Your permission level is `{level}`"))
                .await;
        }

        // The raw tail keeps quoting intact so names with spaces work.
        let query = invocation.arg_tail;
        match users::find_member(invocation.bot.gateway(), context, query).await {
            Ok(Some(target)) => {
                let level = invocation.bot.perms().level(context, target.id()).await?;
                invocation
                    .respond(&format!(
                        "The permission level of `{}` is `{level}`",
                        target.display_name()
                    ))
                    .await
            }
            Ok(None) => Err(BotError::command(
                self.name(),
                "The specified user is not a member of this server.",
            )),
            Err(BotError::AmbiguousUser { query, candidates }) => {
                let mut reply = format!(
                    "More than one member matched the query `{query}`. The potential users are:\n"
                );
                for candidate in &candidates {
                    reply.push_str(candidate);
                    reply.push('\n');
                }
                reply.push_str(
                    "\nYou can copy the user's id into this command to get that specific user.",
                );
                invocation.respond(&reply).await
            }
            Err(err) => Err(err),
        }
    }
}
