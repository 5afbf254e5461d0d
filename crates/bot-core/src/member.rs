//! A platform user bound to a context.

use crate::context::BotContext;
use chat_client::{ChatUser, UserId};
use std::sync::Arc;

/// A user as seen from within one context.
///
/// Permission levels are read through
/// [`crate::PermissionStore::level`] rather than cached here, so the store
/// stays the single source of truth.
#[derive(Clone)]
pub struct Member {
    user: ChatUser,
    context: Arc<BotContext>,
}

impl Member {
    pub fn new(context: Arc<BotContext>, user: ChatUser) -> Self {
        Self { user, context }
    }

    pub fn user(&self) -> &ChatUser {
        &self.user
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn context(&self) -> &Arc<BotContext> {
        &self.context
    }

    pub fn display_name(&self) -> &str {
        &self.user.name
    }

    /// The `<@id>` mention form for this member.
    pub fn mention(&self) -> String {
        self.user.mention()
    }
}
