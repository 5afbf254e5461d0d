//! Built-in commands.

mod archon;
mod config;
mod getperms;
mod help;
mod listhandlers;
mod setperms;
mod shutdown;

pub use archon::{ArchonCurrentContext, ArchonDispatch, ArchonForcePerms, ArchonHelp};
pub use config::ConfigCommand;
pub use getperms::GetPermsCommand;
pub use help::HelpCommand;
pub use listhandlers::ListHandlersCommand;
pub use setperms::SetPermsCommand;
pub use shutdown::ShutdownCommand;

use crate::command::{ArchonCommand, Command, Invocation};
use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use crate::member::Member;
use std::sync::Arc;

/// The stock command set every bot starts with.
pub fn builtin_commands() -> Vec<Arc<dyn Command>> {
    vec![
        Arc::new(ArchonDispatch),
        Arc::new(ConfigCommand),
        Arc::new(GetPermsCommand),
        Arc::new(HelpCommand),
        Arc::new(ListHandlersCommand),
        Arc::new(SetPermsCommand),
        Arc::new(ShutdownCommand),
    ]
}

/// The stock archon command set.
pub fn builtin_archon_commands() -> Vec<Arc<dyn ArchonCommand>> {
    vec![
        Arc::new(ArchonCurrentContext),
        Arc::new(ArchonForcePerms),
        Arc::new(ArchonHelp),
    ]
}

/// The invocation's context, or the standard console refusal.
fn require_context<'a>(
    invocation: &Invocation<'a>,
    command: &str,
) -> BotResult<&'a Arc<BotContext>> {
    invocation.context.ok_or_else(|| {
        BotError::command(command, "This command is not available from the console.")
    })
}

/// The invoking member, or the standard console refusal.
fn require_member<'a>(invocation: &Invocation<'a>, command: &str) -> BotResult<&'a Member> {
    invocation.member.ok_or_else(|| {
        BotError::command(command, "This command is not available from the console.")
    })
}
