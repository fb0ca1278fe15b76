//! Static-file endpoint serving generated data packages
//!
//! Serves the package directory over HTTP on a dedicated background task
//! until shutdown is requested through a cancellation token.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use cot_core::ServerError;

/// Running file server state
///
/// Exists only between a successful `start` and the next `stop`. Dropping
/// the handle cancels the serve task so the endpoint cannot outlive its
/// owner, but orderly shutdown goes through [`FileServerHandle::shutdown`],
/// which also waits for the serving loop to exit.
#[derive(Debug)]
pub(crate) struct FileServerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<std::io::Result<()>>>,
    local_addr: SocketAddr,
}

impl FileServerHandle {
    /// Bind the listener and spawn the serving loop
    pub(crate) async fn spawn(bind_addr: &str, root: PathBuf) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.to_string(),
                source,
            })?;

        tracing::info!("file server listening on {}", local_addr);

        let app = Router::new().fallback_service(ServeDir::new(root));

        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        Ok(Self {
            cancel,
            task: Some(task),
            local_addr,
        })
    }

    /// Address the listener is bound to
    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal shutdown and wait for the serving loop to exit
    ///
    /// The listening socket is released once this returns.
    pub(crate) async fn shutdown(mut self) -> Result<(), ServerError> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            match task.await {
                Ok(serve_result) => serve_result.map_err(|source| ServerError::Serve { source })?,
                Err(join_err) => {
                    return Err(ServerError::Serve {
                        source: std::io::Error::other(join_err),
                    })
                }
            }
        }
        tracing::info!("file server stopped");
        Ok(())
    }
}

impl Drop for FileServerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}
