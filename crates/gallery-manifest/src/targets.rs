//! Resolution of installation-target version ranges into friendly labels.
//!
//! A target declares a version-range expression, either a bare dotted
//! version (`16.0`) or an interval (`[16.0,17.0)`, `[17.0,)`) where square
//! brackets are inclusive and parentheses exclusive. Ranges resolve at
//! major-version granularity against the set of product majors the gallery
//! knows about.

use std::collections::HashSet;
use std::str::FromStr;

use crate::package::InstallationTarget;
use crate::version::VsVersion;

/// Major versions the gallery knows how to label, ascending.
pub const KNOWN_MAJORS: &[u64] = &[10, 11, 12, 14, 15, 16, 17, 18];

/// Resolve a version-range expression to the known majors it covers.
///
/// An unparsable lower bound (or bare version) yields an empty set rather
/// than an error; a malformed range in one target must not fail the whole
/// manifest.
pub fn resolve_majors(range: &str) -> Vec<u64> {
    let range = range.trim();

    let Some(first) = range.chars().next() else {
        return Vec::new();
    };

    if first != '[' && first != '(' {
        // Legacy single-version form.
        return match VsVersion::from_str(range) {
            Ok(v) if KNOWN_MAJORS.contains(&v.major) => vec![v.major],
            _ => Vec::new(),
        };
    }

    let lower_inclusive = first == '[';
    let upper_inclusive = range.ends_with(']');
    let inner = range
        .trim_start_matches(['[', '('])
        .trim_end_matches([']', ')']);

    let (from_str, to_str) = match inner.split_once(',') {
        Some((from, to)) => (from.trim(), Some(to.trim())),
        None => (inner.trim(), None),
    };

    let Ok(from) = VsVersion::from_str(from_str) else {
        return Vec::new();
    };

    let min = if lower_inclusive {
        from.major
    } else {
        from.major + 1
    };

    let max = match to_str.filter(|s| !s.is_empty()).map(VsVersion::from_str) {
        None | Some(Err(_)) => highest_known_major(),
        Some(Ok(to)) => {
            if upper_inclusive {
                to.major
            } else if to.minor == 0 && to.build.unwrap_or(0) == 0 {
                // Exclusive bound sitting exactly on a major boundary
                // excludes the whole major. An absent build component counts
                // as a boundary; historical rule, kept as-is.
                to.major.saturating_sub(1)
            } else {
                to.major
            }
        }
    };

    KNOWN_MAJORS
        .iter()
        .copied()
        .filter(|m| (min..=max).contains(m))
        .collect()
}

fn highest_known_major() -> u64 {
    *KNOWN_MAJORS.last().unwrap_or(&0)
}

/// Derive human-friendly product labels for a set of installation targets.
///
/// Labels are deduplicated case-insensitively and returned in first-occurrence
/// order across the targets.
pub fn friendly_targets(targets: &[InstallationTarget]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut labels = Vec::new();

    for target in targets {
        let id_lower = target.identifier.to_lowercase();
        let arm64 = id_lower.contains("arm64")
            || target
                .product_architecture
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains("arm64"));
        let ssdt = id_lower.contains("ssdt");

        for major in resolve_majors(&target.version_range) {
            let mut label = product_label(major, ssdt);
            if arm64 {
                label.push_str(" (Arm64)");
            }
            if seen.insert(label.to_lowercase()) {
                labels.push(label);
            }
        }
    }

    labels
}

fn product_label(major: u64, ssdt: bool) -> String {
    if ssdt {
        return format!("SQL Server Data Tools (v{major})");
    }

    match major {
        10 => "Visual Studio 2010".to_string(),
        11 => "Visual Studio 2012".to_string(),
        12 => "Visual Studio 2013".to_string(),
        14 => "Visual Studio 2015".to_string(),
        15 => "Visual Studio 2017".to_string(),
        16 => "Visual Studio 2019".to_string(),
        17 => "Visual Studio 2022".to_string(),
        18 => "Visual Studio 2026".to_string(),
        _ => format!("Visual Studio (v{major})"),
    }
}
