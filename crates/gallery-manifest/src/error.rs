use std::path::PathBuf;

/// Errors that can occur while parsing an extension manifest.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No `extension.vsixmanifest` at the archive root.
    #[error("extension manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// A required element or attribute is absent from the manifest.
    ///
    /// The message wording matches the historical gallery so that upload
    /// clients which pattern-match on it keep working.
    #[error("Attribute '{attribute}' could not be found on the '{element}' element in the .vsixmanifest file.")]
    MissingField { element: String, attribute: String },

    /// A version string did not parse as a dotted numeric version.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// The manifest is not well-formed XML.
    #[error("failed to parse .vsixmanifest: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The `.vsext` sidecar is not valid JSON.
    #[error("failed to parse .vsext sidecar: {0}")]
    Sidecar(#[from] serde_json::Error),

    /// I/O error reading the archive tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
