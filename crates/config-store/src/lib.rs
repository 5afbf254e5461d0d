//! File-backed key/value configuration.
//!
//! Each store owns one line-oriented file (`key value` per line) and keeps an
//! ordered in-memory view of it. Mutations persist the whole file, broadcast
//! a change event, and are serialized per backing file. A [`ConfigMirror`]
//! can follow the change stream and copy the file to a secondary location.

mod error;
mod mirror;
mod registry;
mod store;

pub use error::ConfigError;
pub use mirror::ConfigMirror;
pub use registry::ConfigRegistry;
pub use store::{ConfigChange, ConfigStore, DEFAULT_FILE_NAME};
