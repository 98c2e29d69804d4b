//! [`PlayerChannel`] over TCP.
//!
//! Each player listens on a socket address. For every request the referee opens a connection,
//! sends the request as a single line of JSON and reads back a single line of JSON:
//!
//!  * Referee -> Player : `{"request": "play", "lives": 3, "errors": [], "state": {...}}\n`
//!  * Player -> Referee : `{"response": "move", "move": ..., "message": "optional"}\n`
//!
//! Liveness checks send `{"request": "ping"}` and expect `{"response": "pong"}`.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tracing::{instrument, trace, warn};

use crate::channel::{PlayerChannel, TransportError};

/// Reaches players listening on a [`SocketAddr`], one connection per request.
#[derive(Debug, Clone)]
pub struct TcpChannel {
    probe_timeout: Duration,
}

impl TcpChannel {
    const PROBE_TIMEOUT_DURATION: Duration = Duration::from_secs(1);

    /// Create a channel with a 1 second liveness check timeout.
    pub fn new() -> Self {
        Self {
            probe_timeout: Self::PROBE_TIMEOUT_DURATION,
        }
    }

    /// Set how long a liveness check waits for the answer.
    pub fn with_probe_timeout(mut self, value: Duration) -> Self {
        self.probe_timeout = value;
        self
    }

    async fn send_and_recv(addr: &SocketAddr, msg: &Value) -> Result<Value, TransportError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(TransportError::Unreachable)?;
        let (reader, mut writer) = stream.into_split();

        let mut line = msg.to_string();
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(TransportError::Unreachable)?;
        writer.flush().await.map_err(TransportError::Unreachable)?;

        let mut response = String::new();
        let n = BufReader::new(reader)
            .read_line(&mut response)
            .await
            .map_err(TransportError::Unreachable)?;
        if n == 0 {
            return Err(TransportError::Closed);
        }
        trace!(%addr, response = response.trim_end());
        Ok(serde_json::from_str(&response)?)
    }
}

impl Default for TcpChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerChannel for TcpChannel {
    type Handle = SocketAddr;

    #[instrument(skip(self))]
    async fn probe(&self, player: &SocketAddr) -> bool {
        let ping = json!({ "request": "ping" });
        match timeout(self.probe_timeout, Self::send_and_recv(player, &ping)).await {
            Ok(Ok(response)) => response.get("response") == Some(&json!("pong")),
            Ok(Err(e)) => {
                warn!("ping failed: {e}");
                false
            }
            Err(_) => {
                warn!("ping timed out after {:?}", self.probe_timeout);
                false
            }
        }
    }

    #[instrument(skip(self, request))]
    async fn exchange(
        &self,
        player: &SocketAddr,
        request: &Value,
        deadline: Duration,
    ) -> Result<(Value, Duration), TransportError> {
        let start = Instant::now();
        let response = timeout(deadline, Self::send_and_recv(player, request))
            .await
            .map_err(|_| TransportError::Timeout(deadline))??;
        Ok((response, start.elapsed()))
    }
}
