//! Permission levels and their persistence.

use crate::context::BotContext;
use crate::error::{BotError, BotResult};
use chat_client::UserId;
use config_store::ConfigRegistry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Level of a user who is not a member of the server.
pub const LEVEL_NON_MEMBER: u8 = 0;
/// Level of a user blacklisted from all commands.
pub const LEVEL_BLACKLISTED: u8 = 1;
/// Default level of ordinary users.
pub const LEVEL_STANDARD: u8 = 2;
/// Ordinary users trusted with slightly more than average.
pub const LEVEL_TRUSTED: u8 = 3;
/// Users allowed to control basic bot functions; typically moderators.
pub const LEVEL_OPERATOR: u8 = 63;
/// Users allowed to control advanced bot functions, like shutting down.
pub const LEVEL_ADMINISTRATOR: u8 = 127;
/// The server owner.
pub const LEVEL_OWNER: u8 = 254;
/// The backend console and the bot's own account.
pub const LEVEL_CONSOLE: u8 = 255;

/// File each context's levels persist to, one `user-id level` pair per line.
const PERMS_FILE: &str = "user_perms.cfg";

/// Maps (context, user) to a permission level.
///
/// Reads fall back through stored value, then the context's default override,
/// then the process-wide default. Writes land in a cache and persist either
/// immediately or on [`PermissionStore::flush_all`]. The bot's own account
/// always reads [`LEVEL_CONSOLE`] and silently ignores writes.
pub struct PermissionStore {
    configs: Arc<ConfigRegistry>,
    bot_user: UserId,
    default_level: u8,
    cache: RwLock<HashMap<(String, UserId), u8>>,
    dirty: RwLock<HashSet<String>>,
}

impl PermissionStore {
    pub fn new(configs: Arc<ConfigRegistry>, bot_user: UserId, default_level: u8) -> Self {
        Self {
            configs,
            bot_user,
            default_level,
            cache: RwLock::new(HashMap::new()),
            dirty: RwLock::new(HashSet::new()),
        }
    }

    pub fn default_level(&self) -> u8 {
        self.default_level
    }

    /// The permission level of `user` within `context`.
    ///
    /// A stored value that fails to parse is reset to the process default and
    /// reported as [`BotError::MalformedData`].
    pub async fn level(&self, context: &BotContext, user: UserId) -> BotResult<u8> {
        if user == self.bot_user {
            return Ok(LEVEL_CONSOLE);
        }

        let scope = context.storage_name();
        if let Some(level) = self
            .cache
            .read()
            .await
            .get(&(scope.to_string(), user))
            .copied()
        {
            return Ok(level);
        }

        let store = self.configs.store_for(scope, PERMS_FILE).await?;
        store.reload().await.map_err(BotError::Config)?;
        match store.get(&user.to_string()).await {
            Some(raw) => match raw.parse::<u8>() {
                Ok(level) => Ok(level),
                Err(_) => {
                    // Reset the offending key so the next read succeeds.
                    store
                        .set(&user.to_string(), &self.default_level.to_string())
                        .await?;
                    Err(BotError::MalformedData {
                        key: user.to_string(),
                        reason: format!("could not parse `{raw}` as a permission level"),
                    })
                }
            },
            None => Ok(context
                .default_permission(user)
                .unwrap_or(self.default_level)),
        }
    }

    /// Record a new level for `user` in `context`.
    ///
    /// Writing the level a user already holds is a silent no-op. Writes to
    /// the bot's own account are ignored. With `save_now` false the change
    /// stays in the cache until a flush.
    pub async fn set_level(
        &self,
        context: &BotContext,
        user: UserId,
        level: u8,
        save_now: bool,
    ) -> BotResult<()> {
        if user == self.bot_user {
            return Ok(());
        }

        let current = self.level(context, user).await.ok();
        if current == Some(level) {
            return Ok(());
        }

        match current {
            Some(old) => info!(
                "Permission level of user {user} changed from {old} to {level} in context \"{}\".",
                context.name()
            ),
            None => info!(
                "Permission level of user {user} set to {level} in context \"{}\".",
                context.name()
            ),
        }

        let scope = context.storage_name().to_string();
        self.cache
            .write()
            .await
            .insert((scope.clone(), user), level);
        self.dirty.write().await.insert(scope.clone());

        if save_now {
            self.flush_scope(&scope).await?;
        }
        Ok(())
    }

    /// Persist any cached levels for `context`.
    pub async fn flush_context(&self, context: &BotContext) -> BotResult<()> {
        self.flush_scope(context.storage_name()).await
    }

    /// Persist every context with unsaved levels. Called on shutdown.
    pub async fn flush_all(&self) -> BotResult<()> {
        let scopes: Vec<String> = self.dirty.read().await.iter().cloned().collect();
        for scope in scopes {
            self.flush_scope(&scope).await?;
        }
        Ok(())
    }

    async fn flush_scope(&self, scope: &str) -> BotResult<()> {
        if !self.dirty.read().await.contains(scope) {
            return Ok(());
        }
        let entries: Vec<(UserId, u8)> = self
            .cache
            .read()
            .await
            .iter()
            .filter(|((cached_scope, _), _)| cached_scope == scope)
            .map(|((_, user), level)| (*user, *level))
            .collect();

        let store = self.configs.store_for(scope, PERMS_FILE).await?;
        for (user, level) in entries {
            store
                .set_deferred(&user.to_string(), &level.to_string())
                .await;
        }
        store.flush().await.map_err(BotError::Config)?;
        self.dirty.write().await.remove(scope);
        Ok(())
    }
}
