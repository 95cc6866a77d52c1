//! Handler for `pinaudit tree`.

use miette::Result;

use pinaudit_ops::ops_tree::{self, TreeOptions};
use pinaudit_ops::session::InputOverrides;

pub fn exec(inputs: InputOverrides, root: Option<String>, depth: Option<usize>) -> Result<()> {
    let cwd = super::current_dir()?;
    let opts = TreeOptions {
        inputs,
        root,
        depth,
    };
    ops_tree::tree(&cwd, &opts)
}
