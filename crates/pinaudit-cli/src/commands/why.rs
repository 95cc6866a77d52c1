//! Handler for `pinaudit why`.

use miette::Result;

use pinaudit_ops::ops_why;
use pinaudit_ops::session::InputOverrides;

pub fn exec(inputs: InputOverrides, package: &str) -> Result<()> {
    let cwd = super::current_dir()?;
    ops_why::why(&cwd, &inputs, package)
}
