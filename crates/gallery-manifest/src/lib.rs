//! VSIX manifest parsing and the package data model for the extension gallery.
//!
//! This crate turns an extracted extension archive into a normalized
//! [`Package`] record. It understands both generations of the
//! `.vsixmanifest` format (the 2010 schema and the 2012-and-later schema),
//! the version-range mini-language used by installation targets, and the
//! optional `.vsext` sub-extension sidecar.

pub mod error;
pub mod manifest;
pub mod package;
pub mod targets;
pub mod version;

/// The canonical manifest filename at the root of an extension archive.
pub const MANIFEST_FILENAME: &str = "extension.vsixmanifest";

/// File extension of the optional sub-extension bundle sidecar.
pub const SIDECAR_EXTENSION: &str = "vsext";

pub use error::Error;
pub use manifest::parse_package;
pub use package::{InstallationTarget, Package};
pub use version::VsVersion;
