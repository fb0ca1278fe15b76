//! Outbound connection traits

use async_trait::async_trait;
use std::time::Duration;

use crate::error::TransportError;

/// A single scoped outbound connection
///
/// The underlying socket is released when the value is dropped, on every
/// exit path (success, send failure, timeout).
#[async_trait]
pub trait Connection: Send {
    /// Transmit the payload, completing fully or failing with a transport error
    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;
}

/// Opens outbound connections for message delivery
#[async_trait]
pub trait Connector: Send + Sync {
    /// The connection type produced by this connector
    type Conn: Connection;

    /// Open a connection to `address:port`, bounded by `timeout` if set
    async fn connect(
        &self,
        address: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<Self::Conn, TransportError>;
}
