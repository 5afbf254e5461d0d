//! Help command: lists commands or documents one of them.

use crate::command::{Command, Invocation};
use crate::error::{BotError, BotResult};
use crate::perms::LEVEL_STANDARD;
use async_trait::async_trait;

pub struct HelpCommand;

#[async_trait]
impl Command for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }

    fn description(&self) -> &str {
        "Lists every command or returns information on a command.\n\n\
         Text in angle brackets (`<arg>`) is a required argument; text in square \
         brackets (`[arg]`) is optional. Arguments are split on spaces; put \
         quotes around an argument to keep spaces inside it, like `cmd \"two words\" next`."
    }

    fn syntax(&self) -> String {
        format!("{} [commandName]", self.name())
    }

    fn required_level(&self) -> u8 {
        LEVEL_STANDARD
    }

    async fn execute(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        match invocation.args.len() {
            0 => self.send_listing(invocation).await,
            1 => self.send_detail(invocation, &invocation.args[0]).await,
            _ => Err(BotError::command(
                self.name(),
                "Invalid argument count. Expected no arguments, or one argument which is the \
                 name of the command you wish to get details on.",
            )),
        }
    }
}

impl HelpCommand {
    async fn send_listing(&self, invocation: &Invocation<'_>) -> BotResult<()> {
        let level = invocation.sender_level().await?;

        let mut text = String::from(
            "Commands marked `+` are commands you can use; `-` marks commands you cannot.\n\
             Say `help command_name_here` to get more documentation on a specific command.\n\
             ```diff\n",
        );
        for command in invocation.bot.commands().all() {
            push_listing_line(&mut text, command.as_ref(), level);
        }

        if let Some(context) = invocation.context {
            if !context.commands().is_empty() {
                text.push_str("\nCommands specific to this server:\n\n");
                for command in context.commands() {
                    push_listing_line(&mut text, command.as_ref(), level);
                }
            }
        }
        text.push_str("```\n");

        invocation.respond(&text).await
    }

    async fn send_detail(&self, invocation: &Invocation<'_>, query: &str) -> BotResult<()> {
        let mut candidates = invocation.bot.commands().all();
        if let Some(context) = invocation.context {
            candidates.extend(context.commands().iter().cloned());
        }

        for command in candidates {
            if let Some(matched) = matched_name(command.as_ref(), query) {
                let text = format_detail(command.as_ref(), &matched);
                return invocation.respond(&text).await;
            }
        }
        Err(BotError::command(
            self.name(),
            format!("Command `{query}` does not exist."),
        ))
    }
}

fn push_listing_line(text: &mut String, command: &dyn Command, level: u8) {
    let marker = if command.usage_for(level).allowed {
        '+'
    } else {
        '-'
    };
    text.push_str(&format!(
        "{marker} {:<32} Requires permission level {} (or higher).\n",
        command.name(),
        command.required_level()
    ));
}

/// The name or alias `query` matched, if any.
fn matched_name(command: &dyn Command, query: &str) -> Option<String> {
    if command.name().eq_ignore_ascii_case(query) {
        return Some(command.name().to_string());
    }
    command
        .aliases()
        .iter()
        .find(|alias| alias.eq_ignore_ascii_case(query))
        .map(|alias| alias.to_string())
}

fn format_detail(command: &dyn Command, matched: &str) -> String {
    let mut text = format!(
        "**Command:** `{}`\n{}\n\n**Usage:** `{}`",
        command.name(),
        command.description(),
        command.syntax()
    );

    // Cross-reference every other name the command answers to.
    let other_names: Vec<&str> = std::iter::once(command.name())
        .chain(command.aliases().iter().copied())
        .filter(|name| !name.eq_ignore_ascii_case(matched))
        .collect();
    if !other_names.is_empty() {
        let formatted: Vec<String> = other_names
            .iter()
            .map(|name| format!("`{name}`"))
            .collect();
        text.push_str(&format!(
            "\n**Can also be run with:** {}",
            formatted.join(", ")
        ));
    }
    text
}
