//! Handler for `pinaudit range`.

use miette::Result;

use pinaudit_ops::ops_range;
use pinaudit_util::errors::AuditError;

/// Exits non-zero when the version falls outside the range.
pub fn exec(range: &str, version: &str) -> Result<()> {
    let check = ops_range::range(range, version)?;
    if !check.satisfied {
        return Err(AuditError::Generic {
            message: format!("{version} is outside {}", check.interval),
        }
        .into());
    }
    Ok(())
}
