//! Operation: evaluate one version against one declared range.

use pinaudit_resolver::version::{VersionBound, VersionInterval};
use pinaudit_util::errors::AuditError;

/// Result of checking a version against a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCheck {
    /// The range in canonical notation.
    pub interval: String,
    pub version: String,
    pub satisfied: bool,
}

pub fn check(range: &str, version: &str) -> miette::Result<RangeCheck> {
    let interval = VersionInterval::parse(range).map_err(AuditError::from)?;
    let bound = VersionBound::parse(version).map_err(AuditError::from)?;
    Ok(RangeCheck {
        interval: interval.to_string(),
        version: version.to_string(),
        satisfied: interval.contains(&bound),
    })
}

/// Print whether `version` satisfies `range`.
pub fn range(range: &str, version: &str) -> miette::Result<RangeCheck> {
    let result = check(range, version)?;
    if result.satisfied {
        println!("{} satisfies {}", result.version, result.interval);
    } else {
        println!("{} does not satisfy {}", result.version, result.interval);
    }
    Ok(result)
}
