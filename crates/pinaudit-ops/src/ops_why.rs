//! Operation: explain why a package is in the closure.

use std::path::Path;

use pinaudit_resolver::graph::DependencyGraph;
use pinaudit_util::errors::AuditError;

use crate::session::{self, InputOverrides, Session};

/// Print the roots `name` is attributed to, one dependency path from each,
/// any conflicts it takes part in, and who depends on it.
pub fn why(cwd: &Path, inputs: &InputOverrides, name: &str) -> miette::Result<()> {
    let session = Session::open(session::load_config(cwd, inputs)?)?;
    let closure = session.closure()?;

    let entry = closure.package(name).ok_or_else(|| AuditError::Generic {
        message: format!("'{name}' is not reachable from any root package"),
    })?;
    let graph = DependencyGraph::from_closure(&closure);

    println!("{}", entry.package);
    if !entry.package.is_pinned() {
        println!("  not pinned in {}", session.config.manifest_path().display());
    }

    println!("Attributed to {} root(s):", entry.roots.len());
    for root in &entry.roots {
        match graph.find_path(root, name) {
            Some(path) => {
                let chain: Vec<String> = path.iter().map(|p| p.to_string()).collect();
                println!("  {root}: {}", chain.join(" -> "));
            }
            None => println!("  {root}"),
        }
    }

    let conflicts: Vec<_> = closure.conflicts.involving(name).collect();
    if !conflicts.is_empty() {
        println!("Conflicts:");
        for conflict in conflicts {
            println!("  {conflict}");
        }
    }

    println!();
    print!("{}", graph.print_inverted_tree(name));
    Ok(())
}
