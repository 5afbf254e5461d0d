//! Mirrors a store's backing file to a secondary location.

use crate::error::ConfigError;
use crate::store::ConfigStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Copies the whole backing file to `<mirror dir>/<scope>/<file name>` on
/// every change. Mirror failures are logged and never affect the primary
/// store's mutation outcome.
pub struct ConfigMirror {
    handle: JoinHandle<()>,
}

impl ConfigMirror {
    /// Subscribe to `store` and keep the mirror current in the background.
    ///
    /// The task runs until [`ConfigMirror::stop`] is called.
    pub fn spawn(store: Arc<ConfigStore>, mirror_dir: impl Into<PathBuf>) -> Self {
        let mirror_dir = mirror_dir.into();
        let mut changes = store.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    // A lagged receiver still copies the latest state, since
                    // the mirror is a full-file copy.
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        if let Err(err) = Self::mirror_now(&store, &mirror_dir).await {
                            warn!("Mirror of {:?} failed: {}", store.path(), err);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        Self { handle }
    }

    /// Copy the store's current file contents to the mirror location.
    pub async fn mirror_now(store: &ConfigStore, mirror_dir: &Path) -> Result<(), ConfigError> {
        let file_name = store
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "configuration.cfg".to_string());
        let target_dir = mirror_dir.join(store.scope());
        let target = target_dir.join(file_name);

        let contents = match fs::read(store.path()).await {
            Ok(bytes) => bytes,
            // Nothing persisted yet; nothing to mirror.
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err.into()),
        };

        fs::create_dir_all(&target_dir).await?;
        fs::write(&target, contents).await?;
        debug!("Mirrored {:?} to {:?}", store.path(), target);
        Ok(())
    }

    pub fn stop(self) {
        self.handle.abort();
    }
}
