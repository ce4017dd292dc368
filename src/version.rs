//! Semantic version handling for release tags.

use semver::Version;
use std::cmp::Ordering;

/// Parse a release tag as a semantic version.
///
/// Surrounding whitespace and a single leading `v` are tolerated.
pub fn parse_version(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

pub fn is_valid_semver(tag: &str) -> bool {
    parse_version(tag).is_some()
}

/// True when the tag parses and carries a pre-release component.
pub fn is_pre_release(tag: &str) -> bool {
    parse_version(tag).is_some_and(|v| !v.pre.is_empty())
}

/// Order two tags by SemVer precedence, highest first.
///
/// Build metadata does not participate. Tags that fail to parse sort after
/// every valid tag.
pub fn compare_descending(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(a), Some(b)) => b.cmp_precedence(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The tag rendered without any leading `v`, suitable for directory names.
pub fn clean_version(tag: &str) -> String {
    parse_version(tag)
        .map(|v| v.to_string())
        .unwrap_or_else(|| tag.trim().trim_start_matches('v').to_string())
}
