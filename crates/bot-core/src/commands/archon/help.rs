//! Help over the archon registry.

use crate::command::{ArchonCommand, Invocation};
use crate::error::{BotError, BotResult};
use async_trait::async_trait;

pub struct ArchonHelp;

#[async_trait]
impl ArchonCommand for ArchonHelp {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Returns the list of archon commands that are registered, or information on one of \
         them. Identical to the stock help command, but it targets archon commands."
    }

    fn syntax(&self) -> String {
        format!("{} [archonCommandName]", self.name())
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        match invocation.args.len() {
            0 => {
                let mut text = String::from("Current archon commands:\n```\n");
                for command in invocation.bot.archon().all() {
                    text.push_str(command.name());
                    text.push('\n');
                }
                text.push_str("```\n");
                invocation.respond(&text).await
            }
            1 => {
                let query = &invocation.args[0];
                match invocation.bot.archon().find(query) {
                    Some(command) => {
                        let text = format!(
                            "**Archon command:** `{}`\n{}\n\n**Usage:** `{}`",
                            command.name(),
                            command.description(),
                            command.syntax()
                        );
                        invocation.respond(&text).await
                    }
                    None => Err(BotError::command(
                        self.name(),
                        format!("Archon command `{query}` does not exist."),
                    )),
                }
            }
            _ => Err(BotError::command(
                self.name(),
                "Invalid argument count. Expected no arguments, or one argument which is the \
                 name of the archon command you wish to get details on.",
            )),
        }
    }
}
