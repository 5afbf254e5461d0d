//! Turns inbound text into command executions or passive-handler runs.

use crate::args::split_args;
use crate::bot::Bot;
use crate::command::{ChannelCheck, Command, Invocation};
use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::handler::PassiveHandler;
use crate::member::Member;
use crate::registry::find_named;
use chat_client::{ChannelId, ChatMessage, Gateway};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Longest command name worth looking up.
const MAX_COMMAND_NAME_LEN: usize = 32;

/// Formatting control character stripped from candidate names before
/// matching, so formatted text cannot spoof a command.
const FORMAT_CODE: char = '§';

/// Terminal outcome of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A command ran to completion.
    Completed { command: String },
    Rejected(Rejection),
    /// Execution was cancelled mid-flight; nothing surfaced to the user.
    Aborted { name: String },
    /// A passive handler consumed the message.
    Handled { handler: String },
    /// No passive handler consumed the message.
    Unhandled,
    /// Nothing applied: a fallback context's passive path, a direct message,
    /// or empty input.
    Skipped,
}

/// Why a command invocation was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NameTooLong,
    UnknownCommand {
        name: String,
    },
    Unauthorized {
        command: String,
        required: u8,
        actual: u8,
    },
    WrongChannel {
        command: String,
        suggested: ChannelId,
    },
    /// The command reported an expected, user-facing failure.
    CommandError {
        command: String,
        message: String,
    },
    /// Stored data for the invoker could not be read.
    MalformedData,
}

impl Bot {
    /// Whether `text` is formatted as a command invocation.
    ///
    /// The prefix matches case-insensitively, and text no longer than the
    /// prefix itself never classifies as a command.
    pub fn is_command(&self, text: &str) -> bool {
        if text.len() <= self.prefix().len() {
            return false;
        }
        match text.get(..self.prefix().len()) {
            Some(head) => head.eq_ignore_ascii_case(self.prefix()),
            None => false,
        }
    }

    /// Handle one inbound chat message to completion.
    ///
    /// Expected failures are consumed here and turned into replies; only
    /// gateway and persistence failures propagate to the caller.
    pub async fn dispatch_message(&self, message: &ChatMessage) -> BotResult<Dispatch> {
        let Some(server_id) = message.server_id else {
            // Direct messages resolve no context.
            return Ok(Dispatch::Skipped);
        };
        let context = self.contexts().get(server_id);

        if !self.is_command(&message.content) {
            return self.run_passive_handlers(&context, message).await;
        }

        let mut text = &message.content[self.prefix().len()..];
        if text.starts_with(' ') {
            if !self.allow_space_after_prefix() {
                return self.run_passive_handlers(&context, message).await;
            }
            text = text.trim_start_matches(' ');
        }
        if text.is_empty() {
            return self.run_passive_handlers(&context, message).await;
        }

        let member = Member::new(context.clone(), message.author.clone());
        let tokens = split_args(text);
        let raw_name = tokens[0].as_str();

        if raw_name.chars().count() > MAX_COMMAND_NAME_LEN {
            self.gateway()
                .reply(message, "The command you input is too long.")
                .await?;
            info!(
                "User \"{}\" issued a command that was considered too long to parse.",
                member.display_name()
            );
            return Ok(Dispatch::Rejected(Rejection::NameTooLong));
        }

        let name = raw_name.replace(FORMAT_CODE, "");
        let args = &tokens[1..];
        let arg_tail = if args.is_empty() {
            ""
        } else {
            text.split_once(char::is_whitespace)
                .map(|(_, rest)| rest)
                .unwrap_or("")
        };

        // The context's own commands win over global ones of the same name.
        let command = find_named(context.commands(), &name).or_else(|| self.commands().find(&name));
        let Some(command) = command else {
            self.gateway()
                .reply(message, &format!("The command `{name}` does not exist."))
                .await?;
            info!(
                "User \"{}\" attempted to issue command \"{}\" but it failed because it doesn't exist.",
                member.display_name(),
                name
            );
            return Ok(Dispatch::Rejected(Rejection::UnknownCommand { name }));
        };

        let level = match self.perms().level(&context, member.id()).await {
            Ok(level) => level,
            Err(err @ BotError::MalformedData { .. }) => {
                self.gateway().reply(message, &err.to_string()).await?;
                warn!(
                    "Permission lookup for user \"{}\" failed: {err}",
                    member.display_name()
                );
                return Ok(Dispatch::Rejected(Rejection::MalformedData));
            }
            Err(err) => return Err(err),
        };

        let permission = command.usage_for(level);
        if !permission.allowed {
            let reason = permission.denial_reason.unwrap_or_else(|| {
                format!("You are not authorized to use `{}`.", command.name())
            });
            self.gateway().reply(message, &reason).await?;
            info!(
                "User \"{}\" attempted to issue command \"{}\" but they don't have a high enough permission level.",
                member.display_name(),
                command.name()
            );
            return Ok(Dispatch::Rejected(Rejection::Unauthorized {
                command: command.name().to_string(),
                required: command.required_level(),
                actual: level,
            }));
        }

        if let ChannelCheck::Redirect(suggested) = command.channel_check(message) {
            self.gateway()
                .reply(
                    message,
                    &format!(
                        "`{}` cannot be used in this channel. Use <#{suggested}> instead.",
                        command.name()
                    ),
                )
                .await?;
            return Ok(Dispatch::Rejected(Rejection::WrongChannel {
                command: command.name().to_string(),
                suggested,
            }));
        }

        let invocation = Invocation {
            context: Some(&context),
            member: Some(&member),
            message: Some(message),
            args,
            arg_tail,
            bot: self,
        };
        match command.execute(&invocation).await {
            Ok(()) => {
                info!(
                    "User \"{}\" issued command \"{}\" with args {:?}",
                    member.display_name(),
                    name,
                    args
                );
                Ok(Dispatch::Completed {
                    command: command.name().to_string(),
                })
            }
            Err(BotError::Command {
                command: source,
                message: reason,
            }) => {
                self.gateway()
                    .reply(message, &format!("Failed to issue command `{source}`: {reason}"))
                    .await?;
                info!(
                    "User \"{}\" attempted to issue command \"{source}\" but it failed. The command gave the reason: {reason}",
                    member.display_name()
                );
                Ok(Dispatch::Rejected(Rejection::CommandError {
                    command: source,
                    message: reason,
                }))
            }
            Err(BotError::Cancelled) => {
                warn!(
                    "Command \"{}\" from user \"{}\" was cancelled mid-flight.",
                    command.name(),
                    member.display_name()
                );
                Ok(Dispatch::Aborted {
                    name: command.name().to_string(),
                })
            }
            Err(BotError::AmbiguousUser { query, candidates }) => {
                let mut reply =
                    format!("More than one member matched the query `{query}`. The potential users are:\n");
                for candidate in &candidates {
                    reply.push_str(candidate);
                    reply.push('\n');
                }
                reply.push_str("\nYou can copy the user's id into this command to pick one.");
                self.gateway().reply(message, &reply).await?;
                Ok(Dispatch::Rejected(Rejection::CommandError {
                    command: command.name().to_string(),
                    message: format!("ambiguous user query `{query}`"),
                }))
            }
            Err(
                err @ (BotError::Unauthorized { .. }
                | BotError::WrongChannel { .. }
                | BotError::MalformedData { .. }),
            ) => {
                self.gateway().reply(message, &err.to_string()).await?;
                warn!(
                    "Command \"{}\" from user \"{}\" failed: {err}",
                    command.name(),
                    member.display_name()
                );
                Ok(Dispatch::Rejected(Rejection::CommandError {
                    command: command.name().to_string(),
                    message: err.to_string(),
                }))
            }
            // Gateway and persistence failures are the host loop's problem.
            Err(err) => Err(err),
        }
    }

    /// Handle one line of console input.
    ///
    /// Only the global registry applies; the console has no context of its
    /// own, and commands see a `None` context/member/message triple.
    pub async fn dispatch_console(&self, line: &str) -> BotResult<Dispatch> {
        if line.is_empty() {
            return Ok(Dispatch::Skipped);
        }
        let tokens = split_args(line);
        let name = tokens[0].as_str();
        let args = &tokens[1..];
        let arg_tail = if args.is_empty() {
            ""
        } else {
            line.split_once(char::is_whitespace)
                .map(|(_, rest)| rest)
                .unwrap_or("")
        };

        let Some(command) = self.commands().find(name) else {
            info!(target: "console", "The command `{name}` does not exist.");
            return Ok(Dispatch::Rejected(Rejection::UnknownCommand {
                name: name.to_string(),
            }));
        };

        let invocation = Invocation {
            context: None,
            member: None,
            message: None,
            args,
            arg_tail,
            bot: self,
        };
        match command.execute(&invocation).await {
            Ok(()) => Ok(Dispatch::Completed {
                command: command.name().to_string(),
            }),
            Err(BotError::Command {
                command: source,
                message: reason,
            }) => {
                info!(target: "console", "Failed to issue command `{source}`: {reason}");
                Ok(Dispatch::Rejected(Rejection::CommandError {
                    command: source,
                    message: reason,
                }))
            }
            Err(BotError::Cancelled) => Ok(Dispatch::Aborted {
                name: command.name().to_string(),
            }),
            Err(err @ (BotError::Gateway(_) | BotError::Config(_))) => Err(err),
            Err(err) => {
                info!(target: "console", "{err}");
                Ok(Dispatch::Rejected(Rejection::CommandError {
                    command: command.name().to_string(),
                    message: err.to_string(),
                }))
            }
        }
    }

    /// Run the context's passive handlers over a non-command message.
    async fn run_passive_handlers(
        &self,
        context: &Arc<BotContext>,
        message: &ChatMessage,
    ) -> BotResult<Dispatch> {
        // Fallback contexts never run passive handlers.
        if context.is_fallback() {
            return Ok(Dispatch::Skipped);
        }
        let member = Member::new(context.clone(), message.author.clone());
        for handler in context.handlers() {
            match handler.run(context, &member, message).await {
                Ok(true) => {
                    debug!(
                        "Handler \"{}\" consumed a message from \"{}\".",
                        handler.name(),
                        member.display_name()
                    );
                    return Ok(Dispatch::Handled {
                        handler: handler.name().to_string(),
                    });
                }
                Ok(false) => {}
                Err(BotError::Cancelled) => {
                    warn!("Handler \"{}\" was cancelled mid-flight.", handler.name());
                    return Ok(Dispatch::Aborted {
                        name: handler.name().to_string(),
                    });
                }
                Err(err @ (BotError::Gateway(_) | BotError::Config(_))) => return Err(err),
                Err(err) => {
                    warn!(
                        "Handler \"{}\" failed on a message from \"{}\": {err}",
                        handler.name(),
                        member.display_name()
                    );
                }
            }
        }
        Ok(Dispatch::Unhandled)
    }
}
