//! Config command: inspects and alters a context's configuration file.

use super::require_context;
use crate::command::{Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::perms::LEVEL_OPERATOR;
use async_trait::async_trait;
use config_store::DEFAULT_FILE_NAME;

pub struct ConfigCommand;

#[async_trait]
impl Command for ConfigCommand {
    fn name(&self) -> &str {
        "config"
    }

    fn description(&self) -> &str {
        "Alters bot configuration data."
    }

    fn syntax(&self) -> String {
        format!("{} :get|set|remove|list: [<key> [<value>]]", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_OPERATOR
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let context = require_context(invocation, self.name())?;
        if invocation.args.is_empty() {
            return Err(BotError::command(
                self.name(),
                "Invalid argument count. Expected at least one argument.",
            ));
        }

        let store = invocation
            .bot
            .configs()
            .store_for(context.storage_name(), DEFAULT_FILE_NAME)
            .await?;
        let operation = invocation.args[0].to_lowercase();
        let args = &invocation.args[1..];

        match operation.as_str() {
            "list" => {
                let mut reply = String::from("**Configuration values:**\n```\n");
                for (key, value) in store.entries().await {
                    reply.push_str(&format!("[{key}]={value}\n"));
                }
                reply.push_str("```");
                invocation.respond(&reply).await
            }
            "get" => {
                let key = self.single_key(args, "get")?;
                match store.get(key).await {
                    Some(value) => {
                        invocation
                            .respond(&format!("```\n[{key}]={value}\n```"))
                            .await
                    }
                    None => {
                        invocation
                            .respond("The specified key does not exist in the configuration.")
                            .await
                    }
                }
            }
            "set" => {
                if args.len() != 2 {
                    return Err(BotError::command(
                        self.name(),
                        "Expected two arguments for operation \"set\" -- set <key> <value>",
                    ));
                }
                let key = args[0].as_str();
                self.check_key(key)?;
                store.set(key, &args[1]).await?;
                invocation
                    .respond(&format!("Set [`{key}`] to: `{}`", args[1]))
                    .await
            }
            "remove" => {
                let key = self.single_key(args, "remove")?;
                if store.remove(key).await? {
                    invocation
                        .respond(&format!("Removed configuration entry `{key}`"))
                        .await
                } else {
                    invocation
                        .respond(&format!(
                            "Could not remove configuration entry `{key}` -- it doesn't exist in the first place."
                        ))
                        .await
                }
            }
            other => Err(BotError::command(
                self.name(),
                format!("Invalid operation \"{other}\" (expected get, set, remove, or list)"),
            )),
        }
    }
}

impl ConfigCommand {
    fn single_key<'a>(&self, args: &'a [String], operation: &str) -> BotResult<&'a str> {
        if args.len() != 1 {
            return Err(BotError::command(
                self.name(),
                format!("Expected one argument for operation \"{operation}\" -- {operation} <key>"),
            ));
        }
        self.check_key(&args[0])?;
        Ok(&args[0])
    }

    fn check_key(&self, key: &str) -> BotResult<()> {
        if key.contains(char::is_whitespace) {
            return Err(BotError::command(
                self.name(),
                "Config keys cannot contain spaces.",
            ));
        }
        Ok(())
    }
}
