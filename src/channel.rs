//! How the referee reaches the remote players.
//!
//! The referee only needs two primitives: a liveness check and a request/response exchange
//! bounded by a deadline. Payloads are JSON values; their shape is decided by the referee.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Why an exchange with a player failed
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connecting, writing or reading failed
    #[error("player unreachable: {0}")]
    Unreachable(#[source] std::io::Error),
    /// The deadline passed before a full response arrived
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// The player closed the connection without answering
    #[error("connection closed by player")]
    Closed,
    /// The response is not valid JSON
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Transport used to talk to players.
///
/// Implementations can be TCP connections, in-process channels, HTTP clients...
/// The referee does not care.
#[async_trait]
pub trait PlayerChannel: Send + Sync {
    /// Identifies a player on this transport (an address, a connection id...).
    type Handle: Clone + Send + Sync + std::fmt::Debug;

    /// Returns `true` if the player answers.
    async fn probe(&self, player: &Self::Handle) -> bool;

    /// Sends `request` and waits for the response for at most `deadline`.
    ///
    /// Returns the response along with the time the player took to answer.
    async fn exchange(
        &self,
        player: &Self::Handle,
        request: &Value,
        deadline: Duration,
    ) -> Result<(Value, Duration), TransportError>;
}
