//! Operation: display the dependency tree of each root.

use std::path::Path;

use pinaudit_resolver::graph::DependencyGraph;
use pinaudit_util::errors::AuditError;

use crate::session::{self, InputOverrides, Session};

/// Options for `pinaudit tree`.
#[derive(Debug, Default)]
pub struct TreeOptions {
    pub inputs: InputOverrides,
    /// Show only this root.
    pub root: Option<String>,
    /// Maximum tree depth to display.
    pub depth: Option<usize>,
}

pub fn tree(cwd: &Path, opts: &TreeOptions) -> miette::Result<()> {
    let session = Session::open(session::load_config(cwd, &opts.inputs)?)?;
    let closure = session.closure()?;
    let graph = DependencyGraph::from_closure(&closure);

    let roots: Vec<&str> = match &opts.root {
        Some(root) => {
            if !closure.is_root(root) {
                return Err(AuditError::Generic {
                    message: format!("'{root}' is not in the root list"),
                }
                .into());
            }
            vec![root.as_str()]
        }
        None => graph.roots().map(|p| p.name.as_str()).collect(),
    };

    for (i, root) in roots.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!("{}", graph.print_tree(root, opts.depth));
    }

    if !closure.conflicts.is_empty() {
        println!();
        print!("{}", closure.conflicts);
    }
    Ok(())
}
