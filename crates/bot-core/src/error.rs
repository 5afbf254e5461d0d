//! Bot error taxonomy.

use chat_client::{ChannelId, GatewayError};
use config_store::ConfigError;
use thiserror::Error;

/// Errors produced while handling one inbound message.
///
/// The tagged variants are recovered at the dispatch boundary and turned into
/// user-facing replies or log lines; the transparent wrappers propagate to
/// the host loop.
#[derive(Error, Debug)]
pub enum BotError {
    /// Malformed arguments, an unknown sub-operation, or another expected
    /// failure reported by the command itself.
    #[error("{message}")]
    Command { command: String, message: String },

    #[error("You are not authorized to use `{command}`. It is only available to `{required}` and above (You are at `{actual}`).")]
    Unauthorized {
        command: String,
        required: u8,
        actual: u8,
    },

    #[error("`{command}` cannot be used in this channel. Use <#{suggested}> instead.")]
    WrongChannel {
        command: String,
        suggested: ChannelId,
    },

    /// Stored data could not be parsed into the expected type.
    #[error("Malformed data for `{key}`: {reason}")]
    MalformedData { key: String, reason: String },

    /// A user query matched more than one candidate. Callers present the
    /// candidate list instead of picking one arbitrarily.
    #[error("More than one member matched the query `{query}`.")]
    AmbiguousUser {
        query: String,
        candidates: Vec<String>,
    },

    /// The surrounding operation was aborted.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BotError {
    /// Shorthand for a command-reported user error.
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Command {
            command: command.into(),
            message: message.into(),
        }
    }
}

pub type BotResult<T> = Result<T, BotError>;
