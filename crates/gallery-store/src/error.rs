/// Errors reported by the package store.
///
/// Every variant's message is suitable for direct display to the uploading
/// client; the store has no fatal error class.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The uploaded archive's manifest was missing fields or malformed.
    #[error(transparent)]
    Manifest(#[from] gallery_manifest::Error),

    /// The uploaded payload is not a readable archive.
    #[error("invalid extension archive: {reason}")]
    Archive { reason: String },

    /// I/O failure while persisting or reading package files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored package metadata could not be read back.
    #[error("failed to read package metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// No package with the requested id, in cache or on disk.
    #[error("unknown package: {0}")]
    PackageNotFound(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive {
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
