//! TCP transport integration tests

use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

use cot_core::traits::{Connection, Connector};
use cot_core::TransportError;
use cot_server::TcpConnector;

/// Route test log output through the test harness, once per process
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_send_delivers_full_payload() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let received = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        buf
    });

    let mut connection = TcpConnector
        .connect(
            &addr.ip().to_string(),
            addr.port(),
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap();
    connection
        .send(b"<event uid=\"marker-1\"/>")
        .await
        .unwrap();
    drop(connection);

    assert_eq!(received.await.unwrap(), b"<event uid=\"marker-1\"/>");
}

#[tokio::test]
async fn test_send_without_timeout_blocks_until_delivered() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let received = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.unwrap();
        buf
    });

    let mut connection = TcpConnector
        .connect(&addr.ip().to_string(), addr.port(), None)
        .await
        .unwrap();
    connection.send(b"payload").await.unwrap();
    drop(connection);

    assert_eq!(received.await.unwrap(), b"payload");
}

#[tokio::test]
async fn test_send_times_out_when_peer_stops_reading() {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    // accept the connection but never read from it, so the kernel buffers
    // fill and the write stalls until the timeout elapses
    let (hold_tx, hold_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let _ = hold_rx.await;
        drop(stream);
    });

    let mut connection = TcpConnector
        .connect(
            &addr.ip().to_string(),
            addr.port(),
            Some(Duration::from_millis(200)),
        )
        .await
        .unwrap();

    // large enough to overflow the loopback send and receive buffers
    let payload = vec![0u8; 64 * 1024 * 1024];
    let err = connection.send(&payload).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));

    drop(hold_tx);
}

#[tokio::test]
async fn test_connect_to_closed_port_fails() {
    init_tracing();
    // bind then drop to grab a port with nothing listening on it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = TcpConnector
        .connect("127.0.0.1", port, Some(Duration::from_secs(5)))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Connect { .. }));
}
