//! Context-aware command dispatch for chat bots.
//!
//! A [`Bot`] ties together per-server contexts, global command and
//! passive-handler registries, a permission store backed by flat files, and
//! the dispatcher that routes inbound chat or console text to the matching
//! command. The platform client stays behind
//! [`chat_client::Gateway`]; host applications register their contexts and
//! commands explicitly through [`BotBuilder`].

pub mod args;
mod bot;
mod command;
pub mod commands;
mod context;
mod dispatch;
mod error;
mod handler;
mod member;
pub mod perms;
mod registry;
mod shutdown;
pub mod users;

pub use bot::{Bot, BotBuilder, DEFAULT_COMMAND_PREFIX};
pub use command::{ArchonCommand, ChannelCheck, Command, Invocation, UsagePermission};
pub use context::{BotContext, ContextBuilder, ContextRegistry};
pub use dispatch::{Dispatch, Rejection};
pub use error::{BotError, BotResult};
pub use handler::PassiveHandler;
pub use member::Member;
pub use perms::PermissionStore;
pub use registry::{ArchonRegistry, CommandRegistry};
pub use shutdown::Shutdown;
