//! Message composer trait

use bytes::Bytes;
use std::path::Path;

use crate::cot::CotConfig;

/// Composes the outbound wire payload for one marker
///
/// Implementations must be pure: equal inputs produce equal payloads. The
/// payload must reference the hosted data package at
/// `http://{server_address}:{server_port}/<path relative to the package
/// directory>` so the client knows where to fetch it.
pub trait MessageComposer: Send + Sync {
    /// Compose the payload for `config`, advertising the file server at
    /// `server_address:server_port` and the package at `package_path`
    fn compose(
        &self,
        config: &CotConfig,
        server_address: &str,
        server_port: u16,
        package_path: &Path,
    ) -> Bytes;
}
