//! Outbound TCP transport
//!
//! Default implementation of the connection seam: one short-lived TCP
//! connection per message, optionally bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use cot_core::traits::{Connection, Connector};
use cot_core::TransportError;

/// Opens short-lived TCP connections for message delivery
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

/// A single outbound TCP connection
///
/// The socket closes when this value is dropped, whatever the outcome of
/// the send.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    addr: String,
    timeout: Option<Duration>,
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(
        &self,
        address: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> Result<TcpConnection, TransportError> {
        let addr = format!("{}:{}", address, port);

        let connect = TcpStream::connect(&addr);
        let stream = match timeout {
            Some(limit) => tokio::time::timeout(limit, connect)
                .await
                .map_err(|_| TransportError::Timeout {
                    addr: addr.clone(),
                    timeout: limit,
                })?,
            None => connect.await,
        }
        .map_err(|source| TransportError::Connect {
            addr: addr.clone(),
            source,
        })?;

        tracing::debug!("connected to {}", addr);

        Ok(TcpConnection {
            stream,
            addr,
            timeout,
        })
    }
}

#[async_trait]
impl Connection for TcpConnection {
    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let addr = self.addr.clone();
        let limit = self.timeout;

        let stream = &mut self.stream;
        let write = async move {
            stream.write_all(payload).await?;
            stream.shutdown().await
        };

        match limit {
            Some(limit) => tokio::time::timeout(limit, write)
                .await
                .map_err(|_| TransportError::Timeout {
                    addr: addr.clone(),
                    timeout: limit,
                })?,
            None => write.await,
        }
        .map_err(|source| TransportError::Send { addr, source })
    }
}
