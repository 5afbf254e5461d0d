//! Host configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot configuration
    #[serde(default)]
    pub bot: BotSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotSettings {
    /// Literal prefix marking a chat message as a command
    #[serde(default = "default_prefix")]
    pub command_prefix: String,

    /// Whether a single space may follow the prefix
    #[serde(default = "default_true")]
    pub allow_space_after_prefix: bool,

    /// Directory configuration and permission files live under
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Optional secondary directory configuration files are mirrored to
    #[serde(default)]
    pub mirror_dir: Option<String>,

    /// Permission level of users with no stored record
    #[serde(default = "default_permission_level")]
    pub default_permission_level: u8,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            command_prefix: default_prefix(),
            allow_space_after_prefix: default_true(),
            data_dir: default_data_dir(),
            mirror_dir: None,
            default_permission_level: default_permission_level(),
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_prefix() -> String {
    bot_core::DEFAULT_COMMAND_PREFIX.into()
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> String {
    "data".into()
}

fn default_permission_level() -> u8 {
    bot_core::perms::LEVEL_STANDARD
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
