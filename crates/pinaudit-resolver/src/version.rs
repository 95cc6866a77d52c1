//! Dotted-numeric versions and interval range matching.
//!
//! Only the leading run of digits and dots of a version takes part in
//! comparisons. Anything after it (`-beta.2`, `+sha.abc`, `-preview`) is kept
//! as a suffix for display but ignored when ordering, so `1.2.3-beta` and
//! `1.2.3` compare equal. Missing trailing components compare as zero, so
//! `1.0` and `1.0.0` are the same version; .NET's `System.Version` would order
//! `1.0` first, and pinaudit deliberately does not.
//!
//! Range notation:
//!
//! | text            | meaning                 |
//! |-----------------|-------------------------|
//! | `(, )`          | any version             |
//! | `(, 2.0)`       | `v < 2.0`               |
//! | `(1.0, 2.0)`    | `1.0 < v < 2.0`         |
//! | `[1.0, )`       | `v >= 1.0`              |
//! | `[1.0, 2.0)`    | `1.0 <= v < 2.0`        |
//! | `[1.0, 2.0]`    | `1.0 <= v <= 2.0`       |
//! | `[1.0]`         | `v == 1.0`              |

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

/// Why a range or version could not be parsed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("range '{range}' is malformed: {reason}")]
    Malformed { range: String, reason: String },

    #[error("range '{range}' has a bound without a numeric version: '{bound}'")]
    InvalidBound { range: String, bound: String },

    #[error("version '{0}' has no numeric prefix")]
    InvalidVersion(String),
}

impl RangeError {
    /// The offending text: the range for range errors, the version otherwise.
    pub fn subject(&self) -> &str {
        match self {
            RangeError::Malformed { range, .. } | RangeError::InvalidBound { range, .. } => range,
            RangeError::InvalidVersion(v) => v,
        }
    }
}

impl From<RangeError> for pinaudit_util::errors::AuditError {
    fn from(err: RangeError) -> Self {
        pinaudit_util::errors::AuditError::MalformedRange {
            range: err.subject().to_string(),
            reason: err.to_string(),
        }
    }
}

/// A version reduced to its dotted-numeric prefix, plus the ignored suffix.
#[derive(Debug, Clone)]
pub struct VersionBound {
    components: Vec<u64>,
    suffix: String,
    original: String,
}

impl VersionBound {
    /// Parse the leading dotted-numeric run of `text`.
    ///
    /// Fails when `text` does not start with a digit or a component does not
    /// fit in a `u64`.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        let text = text.trim();
        let prefix_len = text
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(text.len());
        let (numeric, suffix) = text.split_at(prefix_len);
        if !numeric.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(RangeError::InvalidVersion(text.to_string()));
        }

        let mut components = Vec::new();
        for part in numeric.split('.').filter(|p| !p.is_empty()) {
            let n = part
                .parse::<u64>()
                .map_err(|_| RangeError::InvalidVersion(text.to_string()))?;
            components.push(n);
        }

        Ok(Self {
            components,
            suffix: suffix.to_string(),
            original: text.to_string(),
        })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// The part of the version that does not take part in ordering.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for VersionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl Ord for VersionBound {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.components.len().max(other.components.len());
        for i in 0..max_len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for VersionBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionBound {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionBound {}

/// A version interval; an absent bound is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInterval {
    pub lower: Option<VersionBound>,
    pub lower_inclusive: bool,
    pub upper: Option<VersionBound>,
    pub upper_inclusive: bool,
}

impl VersionInterval {
    /// Parse an interval expression.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        let s = text.trim();
        let malformed = |reason: &str| RangeError::Malformed {
            range: text.to_string(),
            reason: reason.to_string(),
        };

        let lower_inclusive = match s.chars().next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(malformed("expected '(' or '[' at the start")),
        };
        let upper_inclusive = match s.chars().last() {
            Some(']') if s.len() > 1 => true,
            Some(')') if s.len() > 1 => false,
            _ => return Err(malformed("expected ')' or ']' at the end")),
        };
        let inner = &s[1..s.len() - 1];

        if inner.matches(',').count() > 1 {
            return Err(malformed("more than two bounds"));
        }
        let Some((lower, upper)) = inner.split_once(',') else {
            // Exact version: [1.0] means exactly 1.0
            if !(lower_inclusive && upper_inclusive) {
                return Err(malformed("an exact version must be written as [version]"));
            }
            let v = parse_bound(text, inner)?
                .ok_or_else(|| malformed("empty interval"))?;
            return Ok(Self {
                lower: Some(v.clone()),
                lower_inclusive: true,
                upper: Some(v),
                upper_inclusive: true,
            });
        };

        Ok(Self {
            lower: parse_bound(text, lower)?,
            lower_inclusive,
            upper: parse_bound(text, upper)?,
            upper_inclusive,
        })
    }

    /// Check if a version satisfies this interval.
    pub fn contains(&self, version: &VersionBound) -> bool {
        let lower_ok = match &self.lower {
            None => true,
            Some(lower) if self.lower_inclusive => version >= lower,
            Some(lower) => version > lower,
        };
        let upper_ok = match &self.upper {
            None => true,
            Some(upper) if self.upper_inclusive => version <= upper,
            Some(upper) => version < upper,
        };
        lower_ok && upper_ok
    }

    /// Parse `version` and check it against this interval.
    pub fn contains_str(&self, version: &str) -> Result<bool, RangeError> {
        Ok(self.contains(&VersionBound::parse(version)?))
    }
}

impl fmt::Display for VersionInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.lower_inclusive { '[' } else { '(' };
        let close = if self.upper_inclusive { ']' } else { ')' };
        match (&self.lower, &self.upper) {
            (Some(lo), Some(hi)) if lo == hi && self.lower_inclusive && self.upper_inclusive => {
                write!(f, "[{lo}]")
            }
            _ => {
                write!(f, "{open}")?;
                if let Some(lo) = &self.lower {
                    write!(f, "{lo}")?;
                }
                write!(f, ", ")?;
                if let Some(hi) = &self.upper {
                    write!(f, "{hi}")?;
                }
                write!(f, "{close}")
            }
        }
    }
}

fn parse_bound(range: &str, side: &str) -> Result<Option<VersionBound>, RangeError> {
    let side = side.trim();
    if side.is_empty() {
        return Ok(None);
    }
    VersionBound::parse(side)
        .map(Some)
        .map_err(|_| RangeError::InvalidBound {
            range: range.to_string(),
            bound: side.to_string(),
        })
}
