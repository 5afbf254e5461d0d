//! Coordinated shutdown.

use crate::error::BotResult;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;
use tracing::{info, warn};

type Hook = Box<dyn Fn() -> BoxFuture<'static, BotResult<()>> + Send + Sync>;

/// Shutdown signal plus the hooks that run before the process exits.
///
/// Hooks run once, best-effort; a failing hook is logged and never blocks the
/// rest of the shutdown sequence.
pub struct Shutdown {
    notify: Notify,
    requested: AtomicBool,
    hooks: Mutex<Vec<(String, Hook)>>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self {
            notify: Notify::new(),
            requested: AtomicBool::new(false),
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Register a hook to run during shutdown.
    pub fn on_shutdown<F, Fut>(&self, name: impl Into<String>, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = BotResult<()>> + Send + 'static,
    {
        self.hooks
            .lock()
            .expect("hook lock poisoned")
            .push((name.into(), Box::new(move || Box::pin(hook()))));
    }

    /// Request shutdown. Safe to call more than once.
    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Wait until shutdown has been requested.
    pub async fn signalled(&self) {
        if self.is_requested() {
            return;
        }
        self.notify.notified().await;
    }

    /// Run every registered hook once, swallowing failures.
    pub(crate) async fn run_hooks(&self) {
        let hooks = std::mem::take(&mut *self.hooks.lock().expect("hook lock poisoned"));
        for (name, hook) in hooks {
            info!("Running shutdown hook \"{name}\"...");
            if let Err(err) = hook().await {
                warn!("Shutdown hook \"{name}\" failed: {err}");
            }
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
