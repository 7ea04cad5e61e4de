//! Free-text search over package records.

use gallery_manifest::Package;

const NAME_POINTS: u32 = 10;
const AUTHOR_POINTS: u32 = 5;
const TAG_POINTS: u32 = 1;

/// Rank `candidates` against `query` on a fixed point scale: a name match
/// scores highest, then author, then tags; non-matches are excluded. Ties
/// keep the candidates' input order.
pub fn search(query: &str, candidates: &[Package]) -> Vec<Package> {
    let mut scored: Vec<(u32, &Package)> = candidates
        .iter()
        .filter_map(|package| {
            let points = score(query, package);
            (points > 0).then_some((points, package))
        })
        .collect();

    // sort_by is stable, so equal scores preserve candidate order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, p)| p.clone()).collect()
}

fn score(query: &str, package: &Package) -> u32 {
    if contains_ci(&package.name, query) {
        NAME_POINTS
    } else if contains_ci(&package.author, query) {
        AUTHOR_POINTS
    } else if contains_ci(package.tags.as_deref().unwrap_or(""), query) {
        TAG_POINTS
    } else {
        0
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
