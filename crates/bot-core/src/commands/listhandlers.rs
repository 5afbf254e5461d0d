//! Lists the passive handlers active in a context.

use super::require_context;
use crate::command::{Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::handler::PassiveHandler;
use crate::perms::LEVEL_STANDARD;
use async_trait::async_trait;

pub struct ListHandlersCommand;

#[async_trait]
impl Command for ListHandlersCommand {
    fn name(&self) -> &str {
        "listhandlers"
    }

    fn description(&self) -> &str {
        "Lists all passive handlers that are currently active. Passive handlers are like \
         commands, but they run on any applicable message rather than an explicit invocation."
    }

    fn syntax(&self) -> String {
        format!("{} [handlerName]", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let context = require_context(invocation, self.name())?;
        match invocation.args.len() {
            0 => {
                let mut reply = String::from("```\n");
                for handler in context.handlers() {
                    reply.push_str(handler.name());
                    reply.push('\n');
                }
                reply.push_str("```");
                invocation.respond(&reply).await
            }
            1 => {
                let query = &invocation.args[0];
                for handler in context.handlers() {
                    if handler.name().eq_ignore_ascii_case(query) {
                        return invocation
                            .respond(&format!(
                                "**{}:** {}",
                                handler.name(),
                                handler.description()
                            ))
                            .await;
                    }
                }
                invocation
                    .respond(&format!(
                        "There is no passive handler with the name {query}\n\
                         (If there's a space in the name, try adding quotation marks around it!)"
                    ))
                    .await
            }
            _ => Err(BotError::command(
                self.name(),
                "Invalid amount of command arguments. Try putting quotation marks around the \
                 name of the handler.",
            )),
        }
    }
}
