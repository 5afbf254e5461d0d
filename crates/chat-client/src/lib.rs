//! Chat platform abstraction.
//!
//! Defines the message and user types the bot works with and the [`Gateway`]
//! trait hiding the actual platform client. The real Discord binding lives
//! outside this workspace; [`MemoryGateway`] stands in for it in tests and
//! local runs.

mod error;
mod gateway;
mod memory;
mod types;

pub use error::GatewayError;
pub use gateway::Gateway;
pub use memory::MemoryGateway;
pub use types::*;
