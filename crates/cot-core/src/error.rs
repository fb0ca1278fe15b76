//! Error taxonomy for the CoT push server
//!
//! Every failure surfaces synchronously to the caller of the failing
//! operation; nothing is logged and swallowed.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Boxed error type used at the collaborator trait seams
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Construction-time configuration errors (fatal, no server created)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A regular file occupies the configured package directory path
    #[error("a file already exists at {path}, cannot create data package directory")]
    PackageDirIsFile { path: PathBuf },

    /// Filesystem failure while resetting the package directory
    #[error("failed to prepare data package directory {path}: {source}")]
    PackageDirIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File server lifecycle errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// `stop()` called with no running file server
    #[error("cannot stop, file server not started")]
    NotRunning,

    /// `start()` called while the file server is already running
    #[error("file server already running on {addr}")]
    AlreadyRunning { addr: std::net::SocketAddr },

    /// The listening socket could not be bound
    #[error("failed to bind file server to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The serving loop exited with an error
    #[error("file server failed: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

/// Outbound transport errors during `push_cot`
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection to the client could not be established
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload could not be transmitted
    #[error("failed to send message to {addr}: {source}")]
    Send {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured send timeout elapsed
    #[error("timed out after {timeout:?} talking to {addr}")]
    Timeout { addr: String, timeout: Duration },
}

/// Errors surfaced by `push_cot`
#[derive(Error, Debug)]
pub enum PushError {
    /// The data-package builder failed; no cache entry was recorded, so a
    /// later push with the same configuration retries the build.
    #[error("failed to build data package")]
    Build(#[source] BoxError),

    /// Transport failure; the cache entry (if created this call) is retained
    /// since the build succeeded independently of the send.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
