//! Shutdown command.

use crate::command::{Command, Invocation};
use crate::error::BotResult;
use crate::perms::LEVEL_ADMINISTRATOR;
use async_trait::async_trait;

pub struct ShutdownCommand;

#[async_trait]
impl Command for ShutdownCommand {
    fn name(&self) -> &str {
        "shutdown"
    }

    fn description(&self) -> &str {
        "Shuts down the bot."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    fn required_level(&self) -> u8 {
        LEVEL_ADMINISTRATOR
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        invocation
            .respond("Sending shutdown signal and shutting down...")
            .await?;
        invocation.bot.shutdown().trigger();
        Ok(())
    }
}
