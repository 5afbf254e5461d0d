//! Global command registries.

use crate::command::{ArchonCommand, Command};
use std::sync::{Arc, RwLock};

/// Case-insensitive match on canonical names first, then alternate names, so
/// an alias never shadows another command's canonical name.
pub fn find_named(commands: &[Arc<dyn Command>], name: &str) -> Option<Arc<dyn Command>> {
    commands
        .iter()
        .find(|command| command.name().eq_ignore_ascii_case(name))
        .or_else(|| {
            commands.iter().find(|command| {
                command
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
            })
        })
        .cloned()
}

/// Display order: required level ascending, then name. Dispatch never relies
/// on this ordering.
pub fn sort_for_display(commands: &mut [Arc<dyn Command>]) {
    commands.sort_by(|a, b| {
        a.required_level()
            .cmp(&b.required_level())
            .then_with(|| a.name().cmp(b.name()))
    });
}

/// The process-wide command list: built-ins plus user-registered commands.
///
/// The merged view is re-sorted eagerly on every mutation; mutation happens
/// at startup while reads happen per message, so staleness flags buy nothing.
/// Per-context commands live on [`crate::BotContext`] and are consulted
/// before this registry during dispatch.
pub struct CommandRegistry {
    builtin: Vec<Arc<dyn Command>>,
    user: RwLock<Vec<Arc<dyn Command>>>,
    merged: RwLock<Vec<Arc<dyn Command>>>,
}

impl CommandRegistry {
    pub fn new(builtin: Vec<Arc<dyn Command>>) -> Self {
        let mut merged = builtin.clone();
        sort_for_display(&mut merged);
        Self {
            builtin,
            user: RwLock::new(Vec::new()),
            merged: RwLock::new(merged),
        }
    }

    /// Register a user-supplied global command.
    pub fn register(&self, command: Arc<dyn Command>) {
        let mut user = self.user.write().expect("registry lock poisoned");
        user.push(command);
        self.rebuild(&user);
    }

    /// Remove a user-registered command by name. Built-ins cannot be removed.
    pub fn unregister(&self, name: &str) -> bool {
        let mut user = self.user.write().expect("registry lock poisoned");
        let before = user.len();
        user.retain(|command| !command.name().eq_ignore_ascii_case(name));
        let removed = user.len() != before;
        if removed {
            self.rebuild(&user);
        }
        removed
    }

    fn rebuild(&self, user: &[Arc<dyn Command>]) {
        let mut merged: Vec<_> = self.builtin.iter().chain(user.iter()).cloned().collect();
        sort_for_display(&mut merged);
        *self.merged.write().expect("registry lock poisoned") = merged;
    }

    /// The merged, sorted view.
    pub fn all(&self) -> Vec<Arc<dyn Command>> {
        self.merged.read().expect("registry lock poisoned").clone()
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn Command>> {
        find_named(&self.merged.read().expect("registry lock poisoned"), name)
    }
}

/// Registry for the nested `archoncmd` dispatch. Sorted by name.
pub struct ArchonRegistry {
    builtin: Vec<Arc<dyn ArchonCommand>>,
    user: RwLock<Vec<Arc<dyn ArchonCommand>>>,
    merged: RwLock<Vec<Arc<dyn ArchonCommand>>>,
}

impl ArchonRegistry {
    pub fn new(builtin: Vec<Arc<dyn ArchonCommand>>) -> Self {
        let mut merged = builtin.clone();
        merged.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            builtin,
            user: RwLock::new(Vec::new()),
            merged: RwLock::new(merged),
        }
    }

    pub fn register(&self, command: Arc<dyn ArchonCommand>) {
        let mut user = self.user.write().expect("registry lock poisoned");
        user.push(command);
        let mut merged: Vec<_> = self.builtin.iter().chain(user.iter()).cloned().collect();
        merged.sort_by(|a, b| a.name().cmp(b.name()));
        *self.merged.write().expect("registry lock poisoned") = merged;
    }

    pub fn all(&self) -> Vec<Arc<dyn ArchonCommand>> {
        self.merged.read().expect("registry lock poisoned").clone()
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn ArchonCommand>> {
        self.merged
            .read()
            .expect("registry lock poisoned")
            .iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
            .cloned()
    }
}
