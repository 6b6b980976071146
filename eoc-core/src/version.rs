//! Version gate: refuses to start a build against a parser that is too old.

pub use semver::Version;
use tracing::debug;

use crate::error::CoreError;

const SNAPSHOT: &str = "-SNAPSHOT";

/// Parser version from which `eo:lint` replaces `eo:verify`.
pub const LINT_SINCE: &str = "0.45.0";

/// Parses `major.minor.patch`, tolerating a leading `v`.
pub fn parse_version(value: &str) -> Result<Version, CoreError> {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).map_err(|_| CoreError::MalformedVersion(value.to_string()))
}

/// Snapshots are treated as newer than any release.
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT)
}

/// Checks that `current` is a snapshot or a release not older than `minimum`.
pub fn verify_minimum(subject: &str, current: &str, minimum: &str) -> Result<(), CoreError> {
    if is_snapshot(current) {
        return Ok(());
    }
    let actual = parse_version(current)?;
    let required = parse_version(minimum)?;
    if actual < required {
        return Err(CoreError::VersionTooOld {
            subject: subject.to_string(),
            minimum: minimum.to_string(),
            current: current.to_string(),
        });
    }
    Ok(())
}

/// Infallible variant used inside pure goal functions; malformed is "no".
pub fn at_least(current: &str, minimum: &str) -> bool {
    is_snapshot(current) || verify_minimum("", current, minimum).is_ok()
}

/// Rejects anything that is neither a snapshot nor a release version.
pub fn validate(subject: &str, current: &str) -> Result<(), CoreError> {
    if is_snapshot(current) {
        return Ok(());
    }
    parse_version(current).map(|_| ()).inspect_err(|_| {
        debug!("{subject} version '{current}' rejected");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_always_pass() {
        assert!(verify_minimum("EO parser", "0.1.0-SNAPSHOT", "99.0.0").is_ok());
        assert!(verify_minimum("EO parser", "1.0-SNAPSHOT", "0.45.0").is_ok());
    }

    #[test]
    fn older_release_is_rejected_with_both_versions() {
        let err = verify_minimum("EO parser", "0.40.0", "0.45.0").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("0.40.0"), "{message}");
        assert!(message.contains("0.45.0"), "{message}");
        assert!(message.contains("EO parser"), "{message}");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn compares_segments_numerically() {
        assert!(verify_minimum("x", "0.100.0", "0.45.0").is_ok());
        assert!(verify_minimum("x", "0.45.0", "0.45.0").is_ok());
        assert!(verify_minimum("x", "0.9.9", "0.10.0").is_err());
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(matches!(
            verify_minimum("x", "WRONG_VERSION", "0.1.0"),
            Err(CoreError::MalformedVersion(_))
        ));
        assert!(parse_version("1.2").is_err());
        assert!(parse_version("1.2.3.4").is_err());
        assert!(parse_version("1.-2.3").is_err());
        assert!(matches!(
            validate("EO parser", "WRONG_VERSION"),
            Err(CoreError::MalformedVersion(value)) if value == "WRONG_VERSION"
        ));
        assert!(validate("EO parser", "0.59.0").is_ok());
    }

    #[test]
    fn at_least_never_fails() {
        assert!(at_least("0.45.0", LINT_SINCE));
        assert!(at_least("0.50.0-SNAPSHOT", LINT_SINCE));
        assert!(!at_least("0.44.9", LINT_SINCE));
        assert!(!at_least("garbage", LINT_SINCE));
    }

    #[test]
    fn accepts_leading_v() {
        assert_eq!(parse_version("v1.2.3").unwrap().to_string(), "1.2.3");
        assert_eq!(parse_version(" 0.59.0 ").unwrap(), Version::new(0, 59, 0));
    }
}
