//! Gateway errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("User lookup failed: {0}")]
    Lookup(String),

    #[error("Gateway connection closed")]
    Closed,
}
