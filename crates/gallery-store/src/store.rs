//! The package store: authoritative cache plus the ingest pipeline.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Duration, Utc};
use gallery_manifest::Package;

use crate::config::GalleryOptions;
use crate::error::{Error, Result};
use crate::validator::{self, IconDecoder, ImageIconDecoder};
use crate::{ARCHIVE_FILENAME, DEFAULT_ICON, METADATA_FILENAME};

/// Process-wide catalog of published packages.
///
/// Constructed once at startup (scanning the package root) and shared by
/// reference with every consumer. Reads take a snapshot under a read lock;
/// the ingest pipeline and the retention sweep serialize behind a single
/// write mutex, so re-uploads of the same id can never interleave their
/// directory replacement, and readers never observe zero or two cache
/// entries for one id.
pub struct PackageStore {
    root: PathBuf,
    options: GalleryOptions,
    decoder: Box<dyn IconDecoder>,
    cache: RwLock<Vec<Package>>,
    ingest_lock: Mutex<()>,
}

impl PackageStore {
    /// Open a store over `options.root`, loading every package directory
    /// that carries an `extension.json`.
    pub fn open(options: GalleryOptions) -> Self {
        Self::with_decoder(options, Box::new(ImageIconDecoder))
    }

    /// Like [`open`](Self::open) with a caller-supplied icon decoder.
    pub fn with_decoder(options: GalleryOptions, decoder: Box<dyn IconDecoder>) -> Self {
        let root = options.root.clone();
        let cache = load_all(&root, decoder.as_ref());
        tracing::debug!(root = %root.display(), packages = cache.len(), "package store opened");
        Self {
            root,
            options,
            decoder,
            cache: RwLock::new(cache),
            ingest_lock: Mutex::new(()),
        }
    }

    /// The package root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of all packages, ordered by publish date descending.
    pub fn packages(&self) -> Vec<Package> {
        self.cache_read().clone()
    }

    /// Look up one package by id.
    ///
    /// Falls back to a direct metadata read from the package directory when
    /// the id is not cached, which supports out-of-band directory
    /// population.
    pub fn get(&self, id: &str) -> Result<Package> {
        if let Some(package) = self.cache_read().iter().find(|p| p.id == id) {
            return Ok(package.clone());
        }

        let metadata = self.root.join(id).join(METADATA_FILENAME);
        let content =
            fs::read_to_string(&metadata).map_err(|_| Error::PackageNotFound(id.to_string()))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Run the full upload pipeline for one archive stream.
    ///
    /// Extracts into a per-call temp directory, parses and validates the
    /// manifest, replaces the package directory wholesale, then swaps the
    /// cache entry. Persisting happens before the swap, so a cache entry
    /// never points at missing files. The temp directory is cleaned up on
    /// every exit path.
    pub fn ingest(
        &self,
        archive: impl Read,
        repo: Option<&str>,
        issue_tracker: Option<&str>,
        readme_url: Option<&str>,
    ) -> Result<Package> {
        let package = self.ingest_inner(archive, repo, issue_tracker, readme_url)?;
        if self.options.remove_old_extensions {
            self.remove_old_extensions();
        }
        Ok(package)
    }

    fn ingest_inner(
        &self,
        mut archive: impl Read,
        repo: Option<&str>,
        issue_tracker: Option<&str>,
        readme_url: Option<&str>,
    ) -> Result<Package> {
        // TempDir cleans up on drop, which covers the parse-failure and
        // panic paths as well as success.
        let temp = tempfile::tempdir()?;
        let temp_vsix = temp.path().join(ARCHIVE_FILENAME);

        {
            let mut file = File::create(&temp_vsix)?;
            io::copy(&mut archive, &mut file)?;
        }

        zip::ZipArchive::new(File::open(&temp_vsix)?)?.extract(temp.path())?;

        let mut package =
            gallery_manifest::parse_package(temp.path(), repo, issue_tracker, readme_url)?;
        tracing::debug!(id = %package.id, version = %package.version, "ingesting package");

        let _guard = self.write_guard();

        // Full replace, no merge with a previous upload's files.
        let package_dir = self.root.join(&package.id);
        if package_dir.exists() {
            fs::remove_dir_all(&package_dir)?;
        }
        fs::create_dir_all(&package_dir)?;

        persist_icon(temp.path(), &package_dir, &mut package)?;
        package.errors = validator::validate(&package, &package_dir, self.decoder.as_ref());

        let json = serde_json::to_string_pretty(&package)?;
        fs::write(package_dir.join(METADATA_FILENAME), json)?;
        fs::copy(&temp_vsix, package_dir.join(ARCHIVE_FILENAME))?;

        sanitize(&mut package);

        {
            let mut cache = self.cache_write();
            cache.retain(|p| p.id != package.id);
            cache.push(package.clone());
            cache.sort_by(|a, b| b.date_published.cmp(&a.date_published));
        }

        Ok(package)
    }

    /// Delete packages older than the configured retention window.
    ///
    /// Per-item failures are logged and skipped; a package whose directory
    /// cannot be removed stays in the cache.
    pub fn remove_old_extensions(&self) {
        let _guard = self.write_guard();
        let cutoff = Utc::now() - Duration::days(self.options.retention_days as i64);

        let expired: Vec<String> = self
            .cache_read()
            .iter()
            .filter(|p| p.date_published < cutoff)
            .map(|p| p.id.clone())
            .collect();

        for id in expired {
            let package_dir = self.root.join(&id);
            match fs::remove_dir_all(&package_dir) {
                Ok(()) => {
                    self.cache_write().retain(|p| p.id != id);
                    tracing::info!(%id, "removed expired package");
                }
                Err(err) => {
                    tracing::warn!(%id, %err, "failed to remove expired package, keeping entry");
                }
            }
        }
    }

    fn write_guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.ingest_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_read(&self) -> RwLockReadGuard<'_, Vec<Package>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_write(&self) -> RwLockWriteGuard<'_, Vec<Package>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_all(root: &Path, decoder: &dyn IconDecoder) -> Vec<Package> {
    let mut packages = Vec::new();

    let Ok(entries) = fs::read_dir(root) else {
        return packages;
    };

    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let metadata = dir.join(METADATA_FILENAME);
        if !metadata.is_file() {
            // Not a package directory
            continue;
        }

        match read_package(&metadata) {
            Ok(mut package) => {
                package.errors = validator::validate(&package, &dir, decoder);
                sanitize(&mut package);
                packages.push(package);
            }
            Err(err) => {
                tracing::warn!(path = %metadata.display(), %err, "skipping unreadable package metadata");
            }
        }
    }

    packages.sort_by(|a, b| b.date_published.cmp(&a.date_published));
    packages
}

fn read_package(metadata: &Path) -> Result<Package> {
    let content = fs::read_to_string(metadata)?;
    Ok(serde_json::from_str(&content)?)
}

/// Rewrite a bare icon filename into its public path (or the default icon)
/// and prefix a scheme-less repo host. Runs on every package before it
/// becomes visible to readers; the on-disk metadata keeps the bare values.
fn sanitize(package: &mut Package) {
    match package.icon.as_deref().map(str::trim) {
        None | Some("") => package.icon = Some(DEFAULT_ICON.to_string()),
        Some(icon) if !icon.starts_with('/') => {
            package.icon = Some(format!("/extensions/{}/{}", package.id, icon));
        }
        _ => {}
    }

    if let Some(repo) = package.repo.as_deref() {
        if !repo.is_empty() && !repo.contains("://") {
            package.repo = Some(format!("https://{repo}"));
        }
    }
}

/// Copy the manifest-referenced icon from the extracted tree into the
/// package directory under a versioned name, and point the package at it.
fn persist_icon(extracted: &Path, package_dir: &Path, package: &mut Package) -> Result<()> {
    let Some(icon_rel) = package.icon.clone().filter(|i| !i.trim().is_empty()) else {
        return Ok(());
    };

    // Manifests authored on Windows reference icons with backslashes
    let source = extracted.join(icon_rel.replace('\\', "/"));
    if !source.is_file() {
        return Ok(());
    }

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_lowercase();
    let name = format!("icon-{}.{}", package.version, extension);
    fs::copy(&source, package_dir.join(&name))?;
    package.icon = Some(name);

    Ok(())
}
