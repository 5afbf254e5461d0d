//! The `archoncmd` nested dispatch and its stock commands.
//!
//! Archon commands are high-power operations (editing bot behavior on a low
//! level) locked behind the administrator level; dispatch over them has the
//! same shape as the top-level command dispatch, scoped to the archon
//! registry.

mod current_context;
mod force_perms;
mod help;

pub use current_context::ArchonCurrentContext;
pub use force_perms::ArchonForcePerms;
pub use help::ArchonHelp;

use crate::command::{ArchonCommand, Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::perms::LEVEL_ADMINISTRATOR;
use async_trait::async_trait;

/// The top-level command that routes into the archon registry.
pub struct ArchonDispatch;

#[async_trait]
impl Command for ArchonDispatch {
    fn name(&self) -> &str {
        "archoncmd"
    }

    fn description(&self) -> &str {
        "Offers commands intended for low-level control of the bot."
    }

    fn syntax(&self) -> String {
        format!(
            "{} <cmd> [cmdArgs]`\nUse `archoncmd help` to get a list of archon commands.",
            self.name()
        )
    }

    fn required_level(&self) -> u8 {
        LEVEL_ADMINISTRATOR
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        if invocation.args.is_empty() {
            return Err(BotError::command(
                self.name(),
                "Invalid argument count. Expected at least one argument.",
            ));
        }
        let sub = &invocation.args[0];
        let Some(command) = invocation.bot.archon().find(sub) else {
            return Err(BotError::command(
                self.name(),
                format!("Unable to execute archon command `{sub}` because it does not exist."),
            ));
        };

        let nested = Invocation {
            context: invocation.context,
            member: invocation.member,
            message: invocation.message,
            args: &invocation.args[1..],
            arg_tail: invocation.arg_tail,
            bot: invocation.bot,
        };
        command.execute(&nested).await
    }
}
