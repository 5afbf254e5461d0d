//! One store per (scope, file name), cached for process lifetime.

use crate::error::ConfigError;
use crate::store::ConfigStore;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Hands out [`ConfigStore`]s under a common base directory.
///
/// Each (scope, file name) pair maps to one store at
/// `<base>/<scope>/<file name>`, created on first request and shared
/// thereafter. Sharing one store per backing file is what serializes
/// writers per file.
pub struct ConfigRegistry {
    base_dir: PathBuf,
    stores: Mutex<HashMap<(String, String), Arc<ConfigStore>>>,
}

impl ConfigRegistry {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// The store for `scope`'s `file_name`, opening it on first use.
    pub async fn store_for(
        &self,
        scope: &str,
        file_name: &str,
    ) -> Result<Arc<ConfigStore>, ConfigError> {
        let mut stores = self.stores.lock().await;
        if let Some(store) = stores.get(&(scope.to_string(), file_name.to_string())) {
            return Ok(store.clone());
        }
        let path = self.base_dir.join(scope).join(file_name);
        let store = Arc::new(ConfigStore::open(scope, path).await?);
        stores.insert((scope.to_string(), file_name.to_string()), store.clone());
        Ok(store)
    }

    /// Every store opened so far.
    pub async fn all(&self) -> Vec<Arc<ConfigStore>> {
        self.stores.lock().await.values().cloned().collect()
    }
}
