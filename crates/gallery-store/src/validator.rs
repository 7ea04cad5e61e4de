//! Advisory validation of uploaded packages.
//!
//! Warnings never block an ingest; they are attached to the package and
//! surfaced to the uploader for display. Icon dimension checking needs an
//! image codec, which stays behind the narrow [`IconDecoder`] trait so the
//! checks themselves are testable without real image files.

use std::path::Path;

use gallery_manifest::Package;

const ICON_MIN_PX: u32 = 90;
const ICON_MAX_PX: u32 = 128;
const MIN_DESCRIPTION_CHARS: usize = 40;
const ALLOWED_ICON_EXTENSIONS: &[&str] = &[".png", ".jpg", ".gif"];

/// Pixel-dimension probe for icon files.
pub trait IconDecoder: Send + Sync {
    /// Return `(width, height)` of the encoded image, or a reason it
    /// could not be decoded.
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), String>;
}

/// [`IconDecoder`] backed by the `image` crate. Reads only the header, so
/// oversized uploads are not fully decoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageIconDecoder;

impl IconDecoder for ImageIconDecoder {
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32), String> {
        image::ImageReader::new(std::io::Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| e.to_string())?
            .into_dimensions()
            .map_err(|e| e.to_string())
    }
}

/// Inspect a package and its icon file under `package_dir`, returning
/// human-readable warnings. Never fails and never mutates the package.
pub fn validate(package: &Package, package_dir: &Path, decoder: &dyn IconDecoder) -> Vec<String> {
    let mut warnings = Vec::new();

    check_icon(package, package_dir, decoder, &mut warnings);

    if package.description.chars().count() < MIN_DESCRIPTION_CHARS {
        warnings.push(
            "Provide a clear description. Make sure to cover why it is great and what it does"
                .to_string(),
        );
    }

    if package.license.as_deref().unwrap_or("").is_empty() {
        warnings.push("No license is specified in the .vsixmanifest".to_string());
    }

    warnings
}

fn check_icon(
    package: &Package,
    package_dir: &Path,
    decoder: &dyn IconDecoder,
    warnings: &mut Vec<String>,
) {
    let icon = package.icon.as_deref().unwrap_or("").trim();

    if icon.is_empty() {
        warnings.push("Icon is missing. Must be 90x90 pixel PNG, GIF, or JPEG".to_string());
        return;
    }

    let icon_lower = icon.to_lowercase();
    if !ALLOWED_ICON_EXTENSIONS
        .iter()
        .any(|ext| icon_lower.ends_with(ext))
    {
        warnings.push("The icon must be 90x90 pixel PNG, GIF, or JPEG".to_string());
        return;
    }

    let icon_path = package_dir.join(icon);
    let Ok(bytes) = std::fs::read(&icon_path) else {
        // Not on disk yet (or unreadable); nothing to measure
        return;
    };

    match decoder.dimensions(&bytes) {
        Ok((width, height)) => {
            if width < ICON_MIN_PX
                || height < ICON_MIN_PX
                || width > ICON_MAX_PX
                || height > ICON_MAX_PX
            {
                warnings.push(format!(
                    "The icon is {width}x{height}px. It must be 90x90px for best rendering on Marketplace and in Visual Studio"
                ));
            }
        }
        Err(reason) => {
            tracing::debug!(icon = %icon_path.display(), %reason, "icon did not decode");
        }
    }
}
