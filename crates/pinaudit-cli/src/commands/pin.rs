//! Handler for `pinaudit pin`.

use miette::Result;

use pinaudit_ops::ops_pin::{self, PinQuery};
use pinaudit_ops::session::InputOverrides;

pub fn exec(inputs: InputOverrides, package: Option<String>, all: bool) -> Result<()> {
    let cwd = super::current_dir()?;
    let query = match package {
        Some(name) if !all => PinQuery::One(name),
        _ => PinQuery::All,
    };
    ops_pin::pin(&cwd, &inputs, &query)
}
