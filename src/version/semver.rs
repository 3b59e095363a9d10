//! Go module version ordering
//!
//! Go module versions are semver with a few conventions on top:
//! - v prefix: v1.2.3
//! - +incompatible suffix: v2.0.0+incompatible (pre-go.mod v2+ modules)
//! - Pseudo-versions: v0.0.0-20210101000000-abcdef123456 and
//!   v1.2.4-0.20210101000000-abcdef123456
//!
//! Pseudo-versions are ordinary pre-releases of their base version, so their
//! timestamps order them among each other and below the base release.

use std::cmp::Ordering;

use semver::Version;

/// Normalize a Go module version for parsing.
///
/// Handles:
/// - v prefix: v1.2.3 -> 1.2.3
/// - +incompatible suffix: v2.0.0+incompatible -> 2.0.0
fn normalize_go_version(version: &str) -> &str {
    let version = version.strip_prefix('v').unwrap_or(version);
    version.strip_suffix("+incompatible").unwrap_or(version)
}

/// Parse a Go module version into a semver::Version
///
/// Partial versions like "v1" or "v1.2" are padded with zeros.
pub fn parse_go_version(version: &str) -> Option<Version> {
    let normalized = normalize_go_version(version);
    let (core, rest) = match normalized.find(['-', '+']) {
        Some(idx) => normalized.split_at(idx),
        None => (normalized, ""),
    };
    let padded = match core.split('.').count() {
        1 => format!("{}.0.0{}", core, rest),
        2 => format!("{}.0{}", core, rest),
        _ => normalized.to_string(),
    };
    Version::parse(&padded).ok()
}

/// Compare two Go module versions by semantic-version precedence
///
/// Returns None when either side cannot be parsed.
pub fn compare_go_versions(a: &str, b: &str) -> Option<Ordering> {
    let a = parse_go_version(a)?;
    let b = parse_go_version(b)?;
    Some(a.cmp_precedence(&b))
}

/// Whether `candidate` has strictly higher precedence than `current`
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare_go_versions(candidate, current) == Some(Ordering::Greater)
}

/// Check if a version is a pseudo-version.
///
/// Pseudo-version formats:
/// - v0.0.0-YYYYMMDDHHMMSS-commit (no base version)
/// - vX.Y.Z-0.YYYYMMDDHHMMSS-commit (with base version)
pub fn is_pseudo_version(version: &str) -> bool {
    let normalized = normalize_go_version(version);

    let Some((_, rest)) = normalized.split_once('-') else {
        return false;
    };

    let parts: Vec<&str> = rest.split('-').collect();
    if parts.len() < 2 {
        return false;
    }

    let timestamp = parts[0].strip_prefix("0.").unwrap_or(parts[0]);
    timestamp.len() == 14 && timestamp.chars().all(|c| c.is_ascii_digit())
}
