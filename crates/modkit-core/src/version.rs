//! Platform version constraint matching
//!
//! Package descriptors scope install blocks to platform versions with a
//! small constraint grammar: comma-separated alternatives, each either a
//! semver requirement (operators and `2.1.*` wildcards) or a `lo-hi`
//! range. Versions in the wild are often truncated ("2.1"), so parsing is
//! lenient and pads missing components with zeroes.

use semver::{Version, VersionReq};
use tracing::debug;

/// Parse a possibly-truncated version string, padding to three components.
///
/// Returns `None` for anything that still fails to parse; an unparseable
/// version never matches a constraint.
pub fn lenient_version(raw: &str) -> Option<Version> {
    let raw = raw.trim();
    // Strip a leading product label like "Platform 2.1".
    let raw = raw.rsplit(' ').next().unwrap_or(raw);

    let (core, suffix) = match raw.find(['-', '+']) {
        Some(idx) => (&raw[..idx], &raw[idx..]),
        None => (raw, ""),
    };

    let dots = core.chars().filter(|c| *c == '.').count();
    let padded = match dots {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => format!("{core}{suffix}"),
    };

    Version::parse(&padded).ok()
}

/// Test a platform version against one constraint alternative.
fn matches_single(platform: &Version, constraint: &str) -> bool {
    let constraint = constraint.trim();
    if constraint.is_empty() {
        return false;
    }

    // A bare "lo-hi" range, inclusive on both ends.
    if let Some((lo, hi)) = constraint.split_once('-') {
        if let (Some(lo), Some(hi)) = (lenient_version(lo), lenient_version(hi)) {
            return *platform >= lo && *platform <= hi;
        }
    }

    // Operator-less constraints like "2.1" mean "exact at the given
    // precision" in the platform's grammar, not the semver caret default.
    let has_operator = constraint.starts_with(['=', '>', '<', '^', '~'])
        || constraint.contains('*')
        || constraint.contains('x');
    let normalized = if has_operator {
        constraint.to_string()
    } else {
        format!("={constraint}")
    };

    if let Ok(req) = VersionReq::parse(&normalized) {
        return req.matches(platform);
    }

    debug!("Unparseable version constraint ignored: {constraint}");
    false
}

/// Evaluate a full constraint string against a platform version.
///
/// Alternatives are comma-separated; the constraint matches when any
/// alternative does. An unparseable platform version matches nothing.
pub fn version_matches(platform: &str, constraint: &str) -> bool {
    let Some(platform) = lenient_version(platform) else {
        debug!("Unparseable platform version: {platform}");
        return false;
    };

    constraint
        .split(',')
        .any(|alt| matches_single(&platform, alt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_pads_components() {
        assert_eq!(lenient_version("2.1").unwrap(), Version::new(2, 1, 0));
        assert_eq!(lenient_version("2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(lenient_version("2.1.4").unwrap(), Version::new(2, 1, 4));
    }

    #[test]
    fn lenient_parse_strips_product_label() {
        assert_eq!(
            lenient_version("Platform 2.1.4").unwrap(),
            Version::new(2, 1, 4)
        );
    }

    #[test]
    fn wildcard_constraints() {
        assert!(version_matches("2.1.4", "2.1.*"));
        assert!(!version_matches("2.2.0", "2.1.*"));
    }

    #[test]
    fn operator_constraints() {
        assert!(version_matches("2.1.4", ">=2.1.0"));
        assert!(!version_matches("2.0.19", ">=2.1.0"));
    }

    #[test]
    fn range_constraints() {
        assert!(version_matches("2.1.0", "2.0-2.1"));
        assert!(version_matches("2.0.5", "2.0-2.1"));
        assert!(!version_matches("2.2.0", "2.0-2.1"));
    }

    #[test]
    fn alternatives_are_a_union() {
        assert!(version_matches("3.0.0", "2.1.*, 3.0.*"));
        assert!(!version_matches("4.0.0", "2.1.*, 3.0.*"));
    }

    #[test]
    fn garbage_never_matches() {
        assert!(!version_matches("2.1.4", "not a version"));
        assert!(!version_matches("not a version", "2.1.*"));
    }
}
