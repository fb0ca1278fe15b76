//! CoT server orchestrator
//!
//! Owns the package directory, the background file-serving endpoint, and
//! the per-marker data package cache. This is the only stateful part of the
//! system; the composer, builder, and transport seams are stateless
//! transforms it is generic over.

use std::collections::HashMap;
use std::fs;
use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use cot_core::traits::{Connection, Connector, DataPackageBuilder, MessageComposer};
use cot_core::{ConfigError, CotConfig, PushError, ServerConfig, ServerError};

use crate::file_server::FileServerHandle;

/// Orchestrator for publishing CoT markers with hosted data packages
///
/// Construction resets the package directory to empty. The file server is
/// started with [`CotServer::start`] (or [`CotServer::scoped`]) and serves
/// the directory until [`CotServer::stop`]. [`CotServer::push_cot`] works
/// whether or not the file server is running; the client just cannot fetch
/// the package until it is.
#[derive(Debug)]
pub struct CotServer<B, M, C> {
    config: ServerConfig,
    builder: B,
    composer: M,
    connector: C,
    /// Non-empty only between a successful `start` and the next `stop`
    handle: Mutex<Option<FileServerHandle>>,
    /// One generated package path per distinct marker configuration.
    /// Entries are never evicted for the lifetime of the instance.
    packages: Mutex<HashMap<CotConfig, PathBuf>>,
}

impl<B, M, C> CotServer<B, M, C>
where
    B: DataPackageBuilder,
    M: MessageComposer,
    C: Connector,
{
    /// Create an orchestrator, resetting its package directory to empty
    ///
    /// Fails with a configuration error if a regular file occupies the
    /// configured package directory path. A loopback client-facing address
    /// is advisory only: it draws a warning because remote clients cannot
    /// reach it, but many single-host test setups use one deliberately.
    pub fn new(
        config: ServerConfig,
        builder: B,
        composer: M,
        connector: C,
    ) -> Result<Self, ConfigError> {
        make_empty_package_dir(&config.data_package_dir)?;

        if config.is_loopback_address() {
            tracing::warn!(
                address = %config.address,
                "loopback addresses are unreachable by most clients; \
                 use the host's assigned network address"
            );
        }

        Ok(Self {
            config,
            builder,
            composer,
            connector,
            handle: Mutex::new(None),
            packages: Mutex::new(HashMap::new()),
        })
    }

    /// The orchestrator's configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Start the background file server
    ///
    /// Binds `(bind_address, port)` and spawns the serving loop on a
    /// dedicated task. Callable again after a prior [`CotServer::stop`];
    /// the server and its task are fully reconstructed each time.
    pub async fn start(&self) -> Result<(), ServerError> {
        let mut handle = self.handle.lock().await;
        if let Some(running) = handle.as_ref() {
            return Err(ServerError::AlreadyRunning {
                addr: running.local_addr(),
            });
        }

        let spawned = FileServerHandle::spawn(
            &self.config.bind_socket_addr(),
            self.config.data_package_dir.clone(),
        )
        .await?;
        *handle = Some(spawned);
        Ok(())
    }

    /// Stop the background file server
    ///
    /// Signals shutdown, waits for the serving loop to exit, and releases
    /// the listening socket. Fails with an invalid-state error when no
    /// server is running.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let running = self.handle.lock().await.take();
        match running {
            Some(handle) => handle.shutdown().await,
            None => Err(ServerError::NotRunning),
        }
    }

    /// Address the file server is bound to, if running
    ///
    /// Useful when binding port 0 and for health checks.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.handle.lock().await.as_ref().map(FileServerHandle::local_addr)
    }

    /// Run `fut` with the file server started, stopping it on the way out
    ///
    /// The server is stopped whether the future's output is a success or a
    /// failure value. If the future panics, the abandoned handle's drop
    /// cancels the serve task as a backstop.
    pub async fn scoped<T>(&self, fut: impl Future<Output = T>) -> Result<T, ServerError> {
        self.start().await?;
        let out = fut.await;
        self.stop().await?;
        Ok(out)
    }

    /// Push a marker to a client, with its data package hosted for fetch
    ///
    /// Builds and caches the data package on first use of a configuration,
    /// composes the message advertising this server's client-facing
    /// address/port, and delivers it over a short-lived connection to
    /// `client_address:client_port`. Exactly one send attempt per call.
    pub async fn push_cot(
        &self,
        cot_config: &CotConfig,
        client_address: &str,
        client_port: u16,
    ) -> Result<(), PushError> {
        let package_path = self.package_path_for(cot_config).await?;

        let message = self.composer.compose(
            cot_config,
            &self.config.address,
            self.config.port,
            &package_path,
        );

        tracing::debug!(
            uid = %cot_config.uid,
            client = %client_address,
            port = client_port,
            bytes = message.len(),
            "sending cot message"
        );

        let mut connection = self
            .connector
            .connect(client_address, client_port, self.config.timeout)
            .await?;
        connection.send(&message).await?;
        Ok(())
    }

    /// Look up or build the data package for a marker
    ///
    /// The cache lock is held across the build so each distinct
    /// configuration is built at most once, even with concurrent pushes.
    /// A build failure leaves no entry behind, so the next push retries.
    async fn package_path_for(&self, cot_config: &CotConfig) -> Result<PathBuf, PushError> {
        let mut packages = self.packages.lock().await;
        if let Some(path) = packages.get(cot_config) {
            return Ok(path.clone());
        }

        let path = self
            .builder
            .build(cot_config, &self.config.data_package_dir)
            .await
            .map_err(PushError::Build)?;
        tracing::debug!(uid = %cot_config.uid, path = %path.display(), "built data package");

        packages.insert(cot_config.clone(), path.clone());
        Ok(path)
    }
}

/// Reset the package directory to a guaranteed-empty state
///
/// A pre-existing directory is removed recursively so stale packages from a
/// previous run are never served; a pre-existing regular file is a
/// configuration error.
fn make_empty_package_dir(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        return Err(ConfigError::PackageDirIsFile {
            path: path.to_path_buf(),
        });
    }

    if path.exists() {
        fs::remove_dir_all(path).map_err(|source| ConfigError::PackageDirIo {
            path: path.to_path_buf(),
            source,
        })?;
    }

    // create_dir_all already succeeds when the directory exists, so a
    // concurrent recreation after the deletion above is tolerated; anything
    // else occupying the path is an error
    fs::create_dir_all(path).map_err(|source| ConfigError::PackageDirIo {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_empty_package_dir_creates_missing() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("packages");

        make_empty_package_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_make_empty_package_dir_clears_existing() {
        let scratch = tempfile::tempdir().unwrap();
        let dir = scratch.path().join("packages");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("stale.zip"), b"old").unwrap();

        make_empty_package_dir(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_make_empty_package_dir_propagates_create_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let blocker = scratch.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = make_empty_package_dir(&blocker.join("packages")).unwrap_err();
        assert!(matches!(err, ConfigError::PackageDirIo { .. }));
    }

    // A dangling symlink at the package path makes create_dir_all fail with
    // AlreadyExists even though no directory exists; that failure must
    // surface instead of leaving the orchestrator without a directory.
    #[cfg(unix)]
    #[test]
    fn test_make_empty_package_dir_rejects_dangling_symlink() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().join("packages");
        std::os::unix::fs::symlink(scratch.path().join("missing"), &path).unwrap();

        let err = make_empty_package_dir(&path).unwrap_err();
        assert!(matches!(err, ConfigError::PackageDirIo { .. }));
    }

    #[test]
    fn test_make_empty_package_dir_rejects_file() {
        let scratch = tempfile::tempdir().unwrap();
        let path = scratch.path().join("packages");
        fs::write(&path, b"not a directory").unwrap();

        let err = make_empty_package_dir(&path).unwrap_err();
        assert!(matches!(err, ConfigError::PackageDirIsFile { .. }));
        assert!(path.is_file());
    }
}
