//! cot-server: Orchestrator publishing CoT markers with hosted data packages
//!
//! The orchestrator owns a dedicated package directory (reset empty on
//! construction), a background HTTP endpoint serving that directory, and a
//! cache of one generated data package per distinct marker configuration.
//! `push_cot` builds (or reuses) the package, composes the marker message,
//! and delivers it to the client over a short-lived TCP connection.
//!
//! ```ignore
//! let config = ServerConfig::new("192.168.1.10", 8000);
//! let server = CotServer::new(config, builder, composer, TcpConnector)?;
//! server
//!     .scoped(async {
//!         server.push_cot(&marker, "192.168.1.20", 4242).await
//!     })
//!     .await??;
//! ```

mod file_server;
pub mod server;
pub mod transport;

pub use server::CotServer;
pub use transport::{TcpConnection, TcpConnector};

pub use cot_core::{CotConfig, ServerConfig};
