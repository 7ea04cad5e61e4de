//! Gallery store configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Roughly eighteen months, the historical retention window.
const DEFAULT_RETENTION_DAYS: u64 = 548;

/// Configuration for a [`PackageStore`](crate::PackageStore).
///
/// Deserializable from the host application's config file; every field has
/// a default so a bare `root` is enough to get going.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GalleryOptions {
    /// Directory holding one subdirectory per published package.
    pub root: PathBuf,
    /// Whether ingest sweeps out packages older than [`retention_days`](Self::retention_days).
    pub remove_old_extensions: bool,
    /// Age threshold for the retention sweep.
    pub retention_days: u64,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("extensions"),
            remove_old_extensions: true,
            retention_days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl GalleryOptions {
    /// Options rooted at `root` with defaults for everything else.
    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}
