//! The package record and its derived presentation values.

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::targets;

// Characters escaped when a package field is embedded in a link path.
// `#` and `?` stay unescaped to keep links byte-identical with the ones
// historical galleries already published.
const LINK_ESCAPE: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

/// One declared compatibility claim from the manifest: a product
/// identifier, a version-range expression, and an optional architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstallationTarget {
    pub identifier: String,
    pub version_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_architecture: Option<String>,
}

/// A catalog entry for one uploaded extension.
///
/// Serialized field names keep the historical `extension.json` casing so
/// existing on-disk galleries load unchanged. Validation warnings are
/// runtime-only state and are never written to disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Package {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub icon: Option<String>,
    pub tags: Option<String>,
    pub date_published: DateTime<Utc>,
    pub supported_versions: Vec<String>,
    pub installation_targets: Vec<InstallationTarget>,
    pub license: Option<String>,
    pub getting_started_url: Option<String>,
    pub release_notes_url: Option<String>,
    pub more_info_url: Option<String>,
    pub repo: Option<String>,
    pub issue_tracker: Option<String>,
    pub readme_url: Option<String>,
    /// Opaque sub-extension bundle from a `.vsext` sidecar; owned by the
    /// consumer, passed through untouched.
    pub extension_list: Option<serde_json::Value>,
    #[serde(skip)]
    pub errors: Vec<String>,
}

impl Package {
    /// Link to the author listing page.
    pub fn author_link(&self) -> String {
        format!("/author/{}", utf8_percent_encode(&self.author, LINK_ESCAPE))
    }

    /// Direct download link for the archive.
    pub fn download_link(&self) -> String {
        format!(
            "/extensions/{}/{}v{}.vsix",
            self.id,
            utf8_percent_encode(&format!("{} ", self.name), LINK_ESCAPE),
            self.version
        )
    }

    /// Link to the package details page.
    pub fn details_link(&self) -> String {
        format!("/extension/{}", self.id)
    }

    /// Link to the single-package Atom feed.
    pub fn feed_link(&self) -> String {
        format!("/feed/extension/{}", self.id)
    }

    /// A package is unlisted when its tags carry the `unlisted` marker.
    pub fn unlisted(&self) -> bool {
        self.tags
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains("unlisted")
    }

    /// Whether the validator attached any warnings.
    pub fn has_validator_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Deduplicated friendly product labels for the installation targets.
    pub fn friendly_targets(&self) -> Vec<String> {
        targets::friendly_targets(&self.installation_targets)
    }
}
