//! Configuration storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes could not be parsed into the requested type. Distinct
    /// from the key being absent.
    #[error("Malformed value for key `{key}`: could not parse `{value}` as {wanted}")]
    Malformed {
        key: String,
        value: String,
        wanted: &'static str,
    },
}
