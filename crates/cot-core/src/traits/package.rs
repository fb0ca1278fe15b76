//! Data-package builder trait

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::cot::CotConfig;
use crate::error::BoxError;

/// Bundles a marker's attachments into a data package file
#[async_trait]
pub trait DataPackageBuilder: Send + Sync {
    /// Create a new package file under `package_dir` and return its path
    ///
    /// The returned path must be unique per call and must not collide across
    /// distinct configurations for the directory's lifetime.
    async fn build(&self, config: &CotConfig, package_dir: &Path) -> Result<PathBuf, BoxError>;
}
