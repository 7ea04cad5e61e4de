//! Parsing `.vsixmanifest` files into [`Package`] records.
//!
//! Two schema generations are in circulation: the 2010 format (`Identifier`
//! element with child fields) and the 2012-and-later format (`Identity`
//! element with attributes, a `DisplayName` element). The two use different
//! default namespaces, so all lookups here go by local element name only;
//! that makes one set of unqualified lookups work across both dialects.

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use roxmltree::{Document, Node};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::package::{InstallationTarget, Package};
use crate::version::VsVersion;
use crate::{MANIFEST_FILENAME, SIDECAR_EXTENSION};

/// Which manifest generation a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Vs2010,
    Vs2012,
}

/// Dialect-specific fields, pulled out before normalization.
struct RawFields {
    id: String,
    name: String,
    description: String,
    author: String,
    version_text: String,
    icon: Option<String>,
    tags: Option<String>,
}

/// Parse the manifest of an extracted archive into a [`Package`].
///
/// `repo`, `issue_tracker` and `readme_url` are caller-supplied overrides;
/// the manifest itself carries none of them. The publish timestamp is
/// stamped at parse time, so every re-upload gets a fresh one.
pub fn parse_package(
    archive_root: &Path,
    repo: Option<&str>,
    issue_tracker: Option<&str>,
    readme_url: Option<&str>,
) -> Result<Package> {
    let manifest_path = archive_root.join(MANIFEST_FILENAME);
    if !manifest_path.is_file() {
        return Err(Error::ManifestNotFound(manifest_path));
    }

    let xml = std::fs::read_to_string(&manifest_path)?;
    let doc = Document::parse(&xml)?;

    let dialect = if element(&doc, "DisplayName").is_some() {
        Dialect::Vs2012
    } else {
        Dialect::Vs2010
    };
    tracing::debug!(?dialect, path = %manifest_path.display(), "parsing manifest");

    let raw = match dialect {
        Dialect::Vs2012 => RawFields {
            id: required_attr(&doc, "Identity", "Id")?,
            name: required_text(&doc, "DisplayName")?,
            description: required_text(&doc, "Description")?,
            author: required_attr(&doc, "Identity", "Publisher")?,
            version_text: required_attr(&doc, "Identity", "Version")?,
            icon: optional_text(&doc, "Icon"),
            tags: optional_text(&doc, "Tags"),
        },
        Dialect::Vs2010 => RawFields {
            id: required_attr(&doc, "Identifier", "Id")?,
            name: required_text(&doc, "Name")?,
            description: required_text(&doc, "Description")?,
            author: required_text(&doc, "Author")?,
            version_text: required_text(&doc, "Version")?,
            icon: optional_text(&doc, "Icon"),
            tags: None,
        },
    };

    let version = VsVersion::from_str(&raw.version_text)?.to_string();

    let mut package = Package {
        id: raw.id,
        name: raw.name,
        description: raw.description,
        author: raw.author,
        version,
        icon: raw.icon,
        tags: raw.tags,
        date_published: Utc::now(),
        supported_versions: supported_versions(&doc),
        installation_targets: installation_targets(&doc),
        license: None,
        getting_started_url: optional_text(&doc, "GettingStartedGuide"),
        release_notes_url: optional_text(&doc, "ReleaseNotes"),
        more_info_url: optional_text(&doc, "MoreInfo"),
        repo: non_blank(repo),
        issue_tracker: non_blank(issue_tracker),
        readme_url: build_readme_url(repo, readme_url),
        extension_list: None,
        errors: Vec::new(),
    };

    if let Some(license_file) = optional_text(&doc, "License") {
        let license_path = archive_root.join(&license_file);
        if license_path.is_file() {
            package.license = Some(std::fs::read_to_string(&license_path)?);
        }
    }

    package.extension_list = read_sidecar(archive_root)?;

    Ok(package)
}

/// Resolve the effective readme URL.
///
/// An absolute `http(s)` override wins verbatim. Otherwise the conventional
/// `master/README.md` path is assumed and, when a GitHub repo URL is known,
/// rewritten onto the raw-content host.
fn build_readme_url(repo: Option<&str>, readme_url: Option<&str>) -> Option<String> {
    let readme = match non_blank(readme_url) {
        Some(url) => url,
        None => "master/README.md".to_string(),
    };

    if readme.starts_with("http://") || readme.starts_with("https://") {
        return Some(readme);
    }

    let repo = non_blank(repo)?;
    let raw_base = repo.replace("https://github.com", "https://raw.githubusercontent.com");
    Some(format!(
        "{}/{}",
        raw_base.trim_end_matches('/'),
        readme.trim_start_matches('/')
    ))
}

/// All target-declaration elements: `InstallationTarget` in the modern
/// schema, falling back to `VisualStudio` in the 2010 one.
fn target_nodes<'a, 'i>(doc: &'a Document<'i>) -> Vec<Node<'a, 'i>> {
    let targets: Vec<Node> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "InstallationTarget")
        .collect();
    if !targets.is_empty() {
        return targets;
    }
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "VisualStudio")
        .collect()
}

fn installation_targets(doc: &Document) -> Vec<InstallationTarget> {
    let mut targets = Vec::new();

    for node in target_nodes(doc) {
        let identifier = node.attribute("Id").unwrap_or_default();
        let version_range = node.attribute("Version").unwrap_or_default();
        // Entries missing either are skipped, not fatal
        if identifier.is_empty() || version_range.is_empty() {
            continue;
        }

        let product_architecture = node
            .children()
            .find(|c| c.is_element() && c.tag_name().name() == "ProductArchitecture")
            .and_then(|c| c.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        targets.push(InstallationTarget {
            identifier: identifier.to_string(),
            version_range: version_range.to_string(),
            product_architecture,
        });
    }

    targets
}

/// Legacy flat version list, kept for backward display compatibility.
///
/// Deliberately cruder than the installation targets: range punctuation is
/// stripped wholesale and every comma-separated token that parses as a
/// version is kept, deduplicated by canonical string.
fn supported_versions(doc: &Document) -> Vec<String> {
    let mut versions: Vec<String> = Vec::new();

    for node in target_nodes(doc) {
        let Some(raw) = node.attribute("Version") else {
            continue;
        };
        for token in raw.trim_matches(['[', '(', ']', ')']).split(',') {
            if let Ok(version) = VsVersion::from_str(token) {
                let canonical = version.to_string();
                if !versions.contains(&canonical) {
                    versions.push(canonical);
                }
            }
        }
    }

    versions
}

/// First `.vsext` sidecar anywhere under the archive root, as opaque JSON.
fn read_sidecar(archive_root: &Path) -> Result<Option<serde_json::Value>> {
    for entry in WalkDir::new(archive_root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let is_sidecar = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(SIDECAR_EXTENSION));
        if is_sidecar {
            let json = std::fs::read_to_string(entry.path())?;
            return Ok(Some(serde_json::from_str(&json)?));
        }
    }
    Ok(None)
}

fn element<'a, 'i>(doc: &'a Document<'i>, name: &str) -> Option<Node<'a, 'i>> {
    doc.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn inner_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
}

fn required_text(doc: &Document, name: &str) -> Result<String> {
    element(doc, name)
        .map(inner_text)
        .ok_or_else(|| Error::MissingField {
            element: name.to_string(),
            attribute: String::new(),
        })
}

fn optional_text(doc: &Document, name: &str) -> Option<String> {
    element(doc, name)
        .map(inner_text)
        .filter(|t| !t.trim().is_empty())
}

fn required_attr(doc: &Document, name: &str, attribute: &str) -> Result<String> {
    element(doc, name)
        .and_then(|n| n.attribute(attribute))
        .map(str::to_string)
        .ok_or_else(|| Error::MissingField {
            element: name.to_string(),
            attribute: attribute.to_string(),
        })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
