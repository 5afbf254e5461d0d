//! The assembled bot and its builder.

use crate::command::{ArchonCommand, Command};
use crate::commands;
use crate::context::{BotContext, ContextRegistry};
use crate::perms::{PermissionStore, LEVEL_STANDARD};
use crate::registry::{ArchonRegistry, CommandRegistry};
use crate::shutdown::Shutdown;
use chat_client::Gateway;
use config_store::ConfigRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Default prefix marking a chat message as a command invocation.
pub const DEFAULT_COMMAND_PREFIX: &str = ">>";

/// One bot instance: registries, stores, and dispatch configuration.
///
/// Everything is an explicitly constructed value handed out by reference, so
/// tests can build isolated instances; there is no process-wide state.
pub struct Bot {
    gateway: Arc<dyn Gateway>,
    contexts: ContextRegistry,
    commands: CommandRegistry,
    archon: ArchonRegistry,
    configs: Arc<ConfigRegistry>,
    perms: PermissionStore,
    shutdown: Shutdown,
    prefix: String,
    allow_space_after_prefix: bool,
}

impl Bot {
    pub fn builder(gateway: Arc<dyn Gateway>, data_dir: impl Into<PathBuf>) -> BotBuilder {
        BotBuilder::new(gateway, data_dir)
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn contexts(&self) -> &ContextRegistry {
        &self.contexts
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn archon(&self) -> &ArchonRegistry {
        &self.archon
    }

    pub fn configs(&self) -> &Arc<ConfigRegistry> {
        &self.configs
    }

    pub fn perms(&self) -> &PermissionStore {
        &self.perms
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn allow_space_after_prefix(&self) -> bool {
        self.allow_space_after_prefix
    }

    /// Tie up loose ends before the process exits: flush dirty permission
    /// stores, then run registered shutdown hooks best-effort.
    pub async fn finalize(&self) {
        info!("Bot shutdown requested. Tying up loose ends...");
        if let Err(err) = self.perms.flush_all().await {
            error!("Failed to flush permission stores: {err}");
        }
        self.shutdown.run_hooks().await;
        info!("Finalizing shutdown.");
    }
}

/// Explicit registration surface for the host application.
pub struct BotBuilder {
    gateway: Arc<dyn Gateway>,
    data_dir: PathBuf,
    prefix: String,
    allow_space_after_prefix: bool,
    default_level: u8,
    contexts: Vec<BotContext>,
    user_commands: Vec<Arc<dyn Command>>,
    user_archon_commands: Vec<Arc<dyn ArchonCommand>>,
}

impl BotBuilder {
    fn new(gateway: Arc<dyn Gateway>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            gateway,
            data_dir: data_dir.into(),
            prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            allow_space_after_prefix: true,
            default_level: LEVEL_STANDARD,
            contexts: Vec::new(),
            user_commands: Vec::new(),
            user_archon_commands: Vec::new(),
        }
    }

    /// The literal text marking a message as a command. Defaults to `>>`.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether a single space may follow the prefix. Defaults to true.
    pub fn allow_space_after_prefix(mut self, allow: bool) -> Self {
        self.allow_space_after_prefix = allow;
        self
    }

    /// Level of users with no stored record and no context override.
    pub fn default_level(mut self, level: u8) -> Self {
        self.default_level = level;
        self
    }

    /// Register a user-defined context.
    pub fn context(mut self, context: BotContext) -> Self {
        self.contexts.push(context);
        self
    }

    /// Register a user-defined global command.
    pub fn command(mut self, command: Arc<dyn Command>) -> Self {
        self.user_commands.push(command);
        self
    }

    /// Register a user-defined archon command.
    pub fn archon_command(mut self, command: Arc<dyn ArchonCommand>) -> Self {
        self.user_archon_commands.push(command);
        self
    }

    pub fn build(self) -> Arc<Bot> {
        let configs = Arc::new(ConfigRegistry::new(self.data_dir));
        let perms = PermissionStore::new(
            configs.clone(),
            self.gateway.current_user().id,
            self.default_level,
        );

        let commands = CommandRegistry::new(commands::builtin_commands());
        for command in self.user_commands {
            commands.register(command);
        }
        let archon = ArchonRegistry::new(commands::builtin_archon_commands());
        for command in self.user_archon_commands {
            archon.register(command);
        }

        Arc::new(Bot {
            gateway: self.gateway,
            contexts: ContextRegistry::new(self.contexts),
            commands,
            archon,
            configs,
            perms,
            shutdown: Shutdown::new(),
            prefix: self.prefix,
            allow_space_after_prefix: self.allow_space_after_prefix,
        })
    }
}
