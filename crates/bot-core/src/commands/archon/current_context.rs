//! Dumps the context the command ran in.

use crate::command::{ArchonCommand, Invocation};
use crate::error::{BotError, BotResult};
use async_trait::async_trait;

pub struct ArchonCurrentContext;

#[async_trait]
impl ArchonCommand for ArchonCurrentContext {
    fn name(&self) -> &str {
        "currentcontext"
    }

    fn description(&self) -> &str {
        "Returns information on the context representing this server."
    }

    fn syntax(&self) -> String {
        self.name().to_string()
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let context = invocation.context.ok_or_else(|| {
            BotError::command(
                self.name(),
                "Cannot use currentcontext from the console, as it requires a server context \
                 to be present.",
            )
        })?;
        invocation.respond(&context.describe()).await
    }
}
