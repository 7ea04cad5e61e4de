//! Package store and ingest pipeline for the extension gallery.
//!
//! This crate owns the authoritative in-memory cache of published packages
//! and the upload pipeline that feeds it: extract the archive to an
//! isolated temp directory, parse the manifest, validate, persist under the
//! package root, and atomically swap the cache entry. It also answers the
//! lookups the presentation layer needs (listing, by-id, free-text search).

pub mod config;
pub mod error;
pub mod search;
pub mod store;
pub mod validator;

/// Serialized package metadata filename inside each package directory.
pub const METADATA_FILENAME: &str = "extension.json";

/// Fixed name the uploaded archive is stored under.
pub const ARCHIVE_FILENAME: &str = "extension.vsix";

/// Public path served when a package ships no icon.
pub const DEFAULT_ICON: &str = "/img/defaulticon.svg";

pub use config::GalleryOptions;
pub use error::Error;
pub use search::search;
pub use store::PackageStore;
pub use validator::{IconDecoder, ImageIconDecoder};
