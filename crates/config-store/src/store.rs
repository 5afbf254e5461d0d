//! Line-oriented key/value configuration files.

use crate::error::ConfigError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tokio::sync::{broadcast, RwLock};
use tracing::warn;

/// File name used when a caller does not ask for a specific one.
pub const DEFAULT_FILE_NAME: &str = "configuration.cfg";

/// A change to one configuration key.
#[derive(Debug, Clone)]
pub struct ConfigChange {
    /// Storage scope of the store the change happened in.
    pub scope: String,
    pub key: String,
    pub old: Option<String>,
    pub new: Option<String>,
    /// True when the key did not exist before this change. Also fires for
    /// defaults materialized by [`ConfigStore::get_or`].
    pub just_created: bool,
}

struct State {
    values: BTreeMap<String, String>,
    dirty: bool,
}

/// One key/value configuration file held in memory.
///
/// The persisted form is one entry per line, `key value`, the first
/// whitespace run separating the key from the value. Values may contain
/// spaces; multi-line values are not supported. Mutations hold the store's
/// write lock across the file write, so writes to one backing file never
/// interleave.
pub struct ConfigStore {
    scope: String,
    path: PathBuf,
    state: RwLock<State>,
    changes: broadcast::Sender<ConfigChange>,
}

impl ConfigStore {
    /// Open a store, loading the backing file if it exists.
    pub async fn open(
        scope: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = match fs::read_to_string(&path).await {
            Ok(contents) => parse_lines(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        let (changes, _) = broadcast::channel(64);
        Ok(Self {
            scope: scope.into(),
            path,
            state: RwLock::new(State {
                values,
                dirty: false,
            }),
            changes,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribe to change notifications. Dropped or lagging receivers never
    /// affect the mutation that produced the event.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.changes.subscribe()
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.state.read().await.values.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.values.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        self.state.read().await.values.keys().cloned().collect()
    }

    /// All entries in key order.
    pub async fn entries(&self) -> Vec<(String, String)> {
        self.state
            .read()
            .await
            .values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Get a value, materializing `default` on first read.
    ///
    /// An absent key is written back with the default so that later listings
    /// show it; the change event fires with `just_created` set.
    pub async fn get_or(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        {
            let state = self.state.read().await;
            if let Some(value) = state.values.get(key) {
                return Ok(value.clone());
            }
        }
        let mut state = self.state.write().await;
        // Another writer may have materialized the key in between.
        if let Some(value) = state.values.get(key) {
            return Ok(value.clone());
        }
        state.values.insert(key.to_string(), default.to_string());
        self.persist_locked(&mut state).await?;
        self.notify(key, None, Some(default.to_string()));
        Ok(default.to_string())
    }

    /// Get a value parsed as `T`, materializing `default` on first read.
    ///
    /// A stored value that fails to parse is reset to the default and
    /// reported as [`ConfigError::Malformed`] rather than returned silently.
    pub async fn get_parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + ToString,
    {
        let raw = self.get_or(key, &default.to_string()).await?;
        match raw.parse() {
            Ok(value) => Ok(value),
            Err(_) => {
                self.set(key, &default.to_string()).await?;
                Err(ConfigError::Malformed {
                    key: key.to_string(),
                    value: raw,
                    wanted: std::any::type_name::<T>(),
                })
            }
        }
    }

    /// Set a value and persist the whole file.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut state = self.state.write().await;
        let old = state.values.insert(key.to_string(), value.to_string());
        self.persist_locked(&mut state).await?;
        self.notify(key, old, Some(value.to_string()));
        Ok(())
    }

    /// Set a value without persisting. Callers batching writes must call
    /// [`ConfigStore::flush`] afterwards.
    pub async fn set_deferred(&self, key: &str, value: &str) {
        let mut state = self.state.write().await;
        let old = state.values.insert(key.to_string(), value.to_string());
        state.dirty = true;
        self.notify(key, old, Some(value.to_string()));
    }

    /// Persist any deferred writes.
    pub async fn flush(&self) -> Result<(), ConfigError> {
        let mut state = self.state.write().await;
        if state.dirty {
            self.persist_locked(&mut state).await?;
        }
        Ok(())
    }

    /// Remove a key. Returns whether it was present.
    pub async fn remove(&self, key: &str) -> Result<bool, ConfigError> {
        let mut state = self.state.write().await;
        match state.values.remove(key) {
            Some(old) => {
                self.persist_locked(&mut state).await?;
                self.notify(key, Some(old), None);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Re-read the backing file, discarding the in-memory view.
    ///
    /// Skipped with a warning while deferred writes are pending, since they
    /// would be lost.
    pub async fn reload(&self) -> Result<(), ConfigError> {
        let mut state = self.state.write().await;
        if state.dirty {
            warn!(
                "Not reloading {:?}: unsaved deferred changes would be lost",
                self.path
            );
            return Ok(());
        }
        state.values = match fs::read_to_string(&self.path).await {
            Ok(contents) => parse_lines(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(())
    }

    async fn persist_locked(&self, state: &mut State) -> Result<(), ConfigError> {
        let mut contents = String::new();
        for (key, value) in &state.values {
            contents.push_str(key);
            contents.push(' ');
            contents.push_str(value);
            contents.push('\n');
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents.as_bytes()).await?;
        fs::rename(&tmp, &self.path).await?;
        state.dirty = false;
        Ok(())
    }

    fn notify(&self, key: &str, old: Option<String>, new: Option<String>) {
        let change = ConfigChange {
            scope: self.scope.clone(),
            key: key.to_string(),
            just_created: old.is_none() && new.is_some(),
            old,
            new,
        };
        let _ = self.changes.send(change);
    }
}

fn parse_lines(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    for line in contents.lines() {
        if line.is_empty() {
            continue;
        }
        match line.split_once(char::is_whitespace) {
            Some((key, value)) => values.insert(key.to_string(), value.to_string()),
            None => values.insert(line.to_string(), String::new()),
        };
    }
    values
}
