//! Handler for `pinaudit audit`.

use std::path::PathBuf;

use miette::Result;

use pinaudit_ops::ops_audit::{self, AuditOptions};
use pinaudit_ops::session::InputOverrides;

pub fn exec(
    inputs: InputOverrides,
    out_dir: Option<PathBuf>,
    no_assemblies: bool,
    strict: bool,
    fail_on_conflict: bool,
) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = AuditOptions {
        inputs,
        out_dir,
        no_assemblies,
        strict,
        fail_on_conflict,
    };
    ops_audit::audit(&cwd, &opts)?;
    Ok(())
}
