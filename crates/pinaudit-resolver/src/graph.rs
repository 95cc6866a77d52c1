//! Package graph of a closure, for path queries and tree rendering.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use pinaudit_core::package::Package;

use crate::closure::Closure;

/// Edge label: every target framework under which the dependency is declared.
#[derive(Debug, Clone, Default)]
pub struct GraphEdge {
    pub frameworks: BTreeSet<String>,
}

/// The closure's package graph backed by petgraph.
///
/// One node per package name and one edge per `(from, to)` pair; declarations
/// under several frameworks are merged into the edge label.
pub struct DependencyGraph {
    graph: DiGraph<Package, GraphEdge>,
    index: HashMap<String, NodeIndex>,
    roots: Vec<NodeIndex>,
}

impl DependencyGraph {
    pub fn from_closure(closure: &Closure) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for (name, entry) in &closure.packages {
            let idx = graph.add_node(entry.package.clone());
            index.insert(name.clone(), idx);
        }

        let mut edge_index: HashMap<(NodeIndex, NodeIndex), petgraph::graph::EdgeIndex> =
            HashMap::new();
        for edge in &closure.edges {
            let (Some(&from), Some(&to)) = (index.get(&edge.from_package), index.get(&edge.to_package))
            else {
                continue;
            };
            let eidx = *edge_index
                .entry((from, to))
                .or_insert_with(|| graph.add_edge(from, to, GraphEdge::default()));
            graph[eidx].frameworks.insert(edge.target_framework.clone());
        }

        let roots = closure
            .roots
            .iter()
            .filter_map(|r| index.get(r).copied())
            .collect();

        Self { graph, index, roots }
    }

    /// Look up a package by name.
    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Package {
        &self.graph[idx]
    }

    /// Root packages, in input order.
    pub fn roots(&self) -> impl Iterator<Item = &Package> {
        self.roots.iter().map(|&idx| &self.graph[idx])
    }

    /// Direct dependencies of a node, ordered by name.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &GraphEdge)> {
        self.neighbors(idx, Direction::Outgoing)
    }

    /// Reverse dependencies (who depends on this node), ordered by name.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &GraphEdge)> {
        self.neighbors(idx, Direction::Incoming)
    }

    fn neighbors(&self, idx: NodeIndex, dir: Direction) -> Vec<(NodeIndex, &GraphEdge)> {
        let mut out: Vec<_> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = if dir == Direction::Outgoing {
                    e.target()
                } else {
                    e.source()
                };
                (other, e.weight())
            })
            .collect();
        out.sort_by(|a, b| self.graph[a.0].name.cmp(&self.graph[b.0].name));
        out
    }

    /// A shortest dependency path from `from` to `to`, both included.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&Package>> {
        let start = self.find(from)?;
        let goal = self.find(to)?;
        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1usize, |_| 0)?;
        Some(path.into_iter().map(|idx| &self.graph[idx]).collect())
    }

    /// Render the dependency tree below `root`.
    ///
    /// A package already printed on the current branch is marked `(cycle)` and
    /// not expanded again; a package expanded elsewhere is marked `(*)`.
    pub fn print_tree(&self, root: &str, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(root) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut on_branch = HashSet::from([idx]);
        let mut expanded = HashSet::from([idx]);
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, edge)) in deps.into_iter().enumerate() {
            let walk = TreeWalk {
                prefix: "",
                is_last: i == count - 1,
                depth: 1,
                max_depth,
            };
            self.print_subtree(&mut output, child, edge, walk, &mut on_branch, &mut expanded);
        }
        output
    }

    fn print_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &GraphEdge,
        walk: TreeWalk<'_>,
        on_branch: &mut HashSet<NodeIndex>,
        expanded: &mut HashSet<NodeIndex>,
    ) {
        let connector = if walk.is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        let frameworks = edge.frameworks.iter().cloned().collect::<Vec<_>>().join(", ");
        let marker = if on_branch.contains(&idx) {
            " (cycle)"
        } else if expanded.contains(&idx) && !self.dependencies_of(idx).is_empty() {
            " (*)"
        } else {
            ""
        };
        output.push_str(&format!(
            "{}{connector}{node} [{frameworks}]{marker}\n",
            walk.prefix
        ));

        if !marker.is_empty() {
            return;
        }
        if walk.max_depth.is_some_and(|max| walk.depth >= max) {
            return;
        }

        on_branch.insert(idx);
        expanded.insert(idx);
        let child_prefix = format!("{}{}", walk.prefix, if walk.is_last { "    " } else { "│   " });
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, child_edge)) in deps.into_iter().enumerate() {
            let next = TreeWalk {
                prefix: &child_prefix,
                is_last: i == count - 1,
                depth: walk.depth + 1,
                max_depth: walk.max_depth,
            };
            self.print_subtree(output, child, child_edge, next, on_branch, expanded);
        }
        on_branch.remove(&idx);
    }

    /// Render who depends on `name`, up to the roots.
    pub fn print_inverted_tree(&self, name: &str) -> String {
        let mut output = String::new();
        let Some(idx) = self.find(name) else {
            return output;
        };
        output.push_str(&format!("{}\n", self.graph[idx]));

        let mut visited = HashSet::from([idx]);
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(&mut output, *dep_idx, "", is_last, &mut visited);
        }
        output
    }

    fn print_inverted_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        let node = &self.graph[idx];
        output.push_str(&format!("{prefix}{connector}{node}\n"));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let dependents = self.dependents_of(idx);
        let count = dependents.len();
        for (i, (dep_idx, _)) in dependents.iter().enumerate() {
            let is_last = i == count - 1;
            self.print_inverted_subtree(output, *dep_idx, &child_prefix, is_last, visited);
        }

        visited.remove(&idx);
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

#[derive(Clone, Copy)]
struct TreeWalk<'p> {
    prefix: &'p str,
    is_last: bool,
    depth: usize,
    max_depth: Option<usize>,
}
