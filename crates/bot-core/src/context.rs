//! Server contexts and their registry.

use crate::command::Command;
use crate::handler::PassiveHandler;
use crate::registry::sort_for_display;
use chat_client::{ServerId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// The bot's presence in one server.
///
/// A context carries the commands and passive handlers specific to its
/// server, plus permission overrides applied to users seen there for the
/// first time. Servers without a registered context get a fallback context,
/// created on first lookup and cached for the life of the process.
pub struct BotContext {
    name: String,
    storage_name: String,
    server_id: ServerId,
    commands: Vec<Arc<dyn Command>>,
    handlers: Vec<Arc<dyn PassiveHandler>>,
    default_permissions: HashMap<UserId, u8>,
    fallback: bool,
}

impl BotContext {
    pub fn builder(name: impl Into<String>, server_id: ServerId) -> ContextBuilder {
        ContextBuilder::new(name, server_id)
    }

    fn fallback(server_id: ServerId) -> Self {
        Self {
            name: format!("Fallback context for server {server_id}"),
            storage_name: format!("fallback-{server_id}"),
            server_id,
            commands: Vec::new(),
            handlers: Vec::new(),
            default_permissions: HashMap::new(),
            fallback: true,
        }
    }

    /// Display name of this context.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem-safe name this context persists under.
    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    pub fn server_id(&self) -> ServerId {
        self.server_id
    }

    /// Commands specific to this context. Empty for fallback contexts.
    pub fn commands(&self) -> &[Arc<dyn Command>] {
        &self.commands
    }

    /// Passive handlers specific to this context, in name order.
    pub fn handlers(&self) -> &[Arc<dyn PassiveHandler>] {
        &self.handlers
    }

    /// Permission override applied when no level is stored for `user`.
    pub fn default_permission(&self, user: UserId) -> Option<u8> {
        self.default_permissions.get(&user).copied()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Human-readable summary, used by `archoncmd currentcontext`.
    pub fn describe(&self) -> String {
        format!(
            "**Context name:** {}\n**Storage name:** {}\n**Server:** {}\n**Context commands:** {}\n**Passive handlers:** {}\n**Is fallback:** {}",
            self.name,
            self.storage_name,
            self.server_id,
            self.commands.len(),
            self.handlers.len(),
            self.fallback,
        )
    }
}

/// Builds a user-defined [`BotContext`].
pub struct ContextBuilder {
    name: String,
    storage_name: Option<String>,
    server_id: ServerId,
    commands: Vec<Arc<dyn Command>>,
    handlers: Vec<Arc<dyn PassiveHandler>>,
    default_permissions: HashMap<UserId, u8>,
}

impl ContextBuilder {
    fn new(name: impl Into<String>, server_id: ServerId) -> Self {
        Self {
            name: name.into(),
            storage_name: None,
            server_id,
            commands: Vec::new(),
            handlers: Vec::new(),
            default_permissions: HashMap::new(),
        }
    }

    /// Override the storage name. Defaults to `ctx-<server id>`.
    pub fn storage_name(mut self, storage_name: impl Into<String>) -> Self {
        self.storage_name = Some(storage_name.into());
        self
    }

    /// Add a context-specific command. Shadows a global command of the same
    /// name within this context.
    pub fn command(mut self, command: Arc<dyn Command>) -> Self {
        self.commands.push(command);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn PassiveHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Force `user` to `level` until an explicit level is stored for them.
    pub fn default_permission(mut self, user: UserId, level: u8) -> Self {
        self.default_permissions.insert(user, level);
        self
    }

    pub fn build(self) -> BotContext {
        let mut commands = self.commands;
        sort_for_display(&mut commands);
        let mut handlers = self.handlers;
        handlers.sort_by(|a, b| a.name().cmp(b.name()));
        BotContext {
            storage_name: self
                .storage_name
                .unwrap_or_else(|| format!("ctx-{}", self.server_id)),
            name: self.name,
            server_id: self.server_id,
            commands,
            handlers,
            default_permissions: self.default_permissions,
            fallback: false,
        }
    }
}

/// Resolves a server id to its context.
///
/// User-defined contexts are fixed at construction; fallback contexts are
/// created lazily and cached. Exactly one context resolves for a given server
/// id at any time.
pub struct ContextRegistry {
    user_defined: Vec<Arc<BotContext>>,
    fallbacks: RwLock<HashMap<ServerId, Arc<BotContext>>>,
}

impl ContextRegistry {
    pub fn new(contexts: Vec<BotContext>) -> Self {
        Self {
            user_defined: contexts.into_iter().map(Arc::new).collect(),
            fallbacks: RwLock::new(HashMap::new()),
        }
    }

    /// The context for `server`, creating and caching a fallback context if
    /// no user-defined one matches.
    pub fn get(&self, server: ServerId) -> Arc<BotContext> {
        if let Some(context) = self
            .user_defined
            .iter()
            .find(|context| context.server_id() == server)
        {
            return context.clone();
        }

        if let Some(context) = self
            .fallbacks
            .read()
            .expect("context lock poisoned")
            .get(&server)
        {
            return context.clone();
        }

        let mut fallbacks = self.fallbacks.write().expect("context lock poisoned");
        // A racing lookup may have created it in between; reuse theirs.
        fallbacks
            .entry(server)
            .or_insert_with(|| {
                debug!("Creating fallback context for server {server}");
                Arc::new(BotContext::fallback(server))
            })
            .clone()
    }

    pub fn user_defined(&self) -> &[Arc<BotContext>] {
        &self.user_defined
    }

    /// Every context known so far, fallbacks included.
    pub fn all(&self) -> Vec<Arc<BotContext>> {
        let mut contexts = self.user_defined.clone();
        contexts.extend(
            self.fallbacks
                .read()
                .expect("context lock poisoned")
                .values()
                .cloned(),
        );
        contexts
    }
}
