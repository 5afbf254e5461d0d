//! Permission assignment command.

use super::{require_context, require_member};
use crate::command::{Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::perms::LEVEL_OPERATOR;
use crate::users;
use async_trait::async_trait;

pub struct SetPermsCommand;

#[async_trait]
impl Command for SetPermsCommand {
    fn name(&self) -> &str {
        "setperms"
    }

    fn description(&self) -> &str {
        "Sets the specified user's permission level. For safety this only accepts a user id, \
         not a name."
    }

    fn syntax(&self) -> String {
        format!("{} <userId> <newPermissionLevel>", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_OPERATOR
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        if invocation.args.len() != 2 {
            return Err(BotError::command(
                self.name(),
                "Invalid argument count! Expected a user id and a permission level.",
            ));
        }
        let context = require_context(invocation, self.name())?;
        let executor = require_member(invocation, self.name())?;

        let target =
            users::find_member_by_id(invocation.bot.gateway(), context, &invocation.args[0])
                .await?
                .ok_or_else(|| {
                    BotError::command(
                        self.name(),
                        "The specified member could not be found. Are you searching by user id?",
                    )
                })?;

        let level: u8 = invocation.args[1].parse().map_err(|_| {
            BotError::command(
                self.name(),
                format!(
                    "Failed to parse `{}` into a permission level (0-255).",
                    invocation.args[1]
                ),
            )
        })?;

        if target.id() == executor.id() {
            return Err(BotError::command(
                self.name(),
                "You cannot alter your own permission level.",
            ));
        }
        let executor_level = invocation.bot.perms().level(context, executor.id()).await?;
        if executor_level <= level {
            return Err(BotError::command(
                self.name(),
                format!(
                    "You cannot set the permission level of user `{}` to a level equal to or higher than your own.",
                    target.display_name()
                ),
            ));
        }
        let target_level = invocation.bot.perms().level(context, target.id()).await?;
        if executor_level <= target_level {
            return Err(BotError::command(
                self.name(),
                "You cannot edit the permission level of someone at a rank greater than or equal to your own.",
            ));
        }

        invocation
            .bot
            .perms()
            .set_level(context, target.id(), level, true)
            .await?;
        invocation
            .respond(&format!(
                "Set the permission level of user `{}` to `{level}`",
                target.display_name()
            ))
            .await
    }
}
