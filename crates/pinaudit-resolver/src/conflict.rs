//! Declared-range violations and unparseable declarations found during a walk.

use std::collections::BTreeSet;
use std::fmt;

/// A pinned dependency version that falls outside the range a consumer
/// declared for it under one target framework.
///
/// Field order is the report column order, and also the sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Conflict {
    pub target_framework: String,
    pub package_name: String,
    pub package_version: String,
    pub dependency_name: String,
    pub declared_range: String,
    pub pinned_dependency_version: String,
}

/// A declaration that could not be checked because its range (or the pinned
/// version it was checked against) did not parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InvalidRange {
    pub target_framework: String,
    pub package_name: String,
    pub package_version: String,
    pub dependency_name: String,
    pub declared_range: String,
    pub reason: String,
}

/// Deduplicated, ordered set of conflicts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    conflicts: BTreeSet<Conflict>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict. Returns `false` if the same tuple was already known.
    pub fn add(&mut self, conflict: Conflict) -> bool {
        self.conflicts.insert(conflict)
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter()
    }

    /// Conflicts whose consumer or dependency is `name`.
    pub fn involving<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Conflict> + 'a {
        self.conflicts
            .iter()
            .filter(move |c| c.package_name == name || c.dependency_name == name)
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conflicts.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.conflicts.len())?;
        for c in &self.conflicts {
            writeln!(f, "  {c}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) requires {} {} but {} is pinned",
            self.package_name,
            self.package_version,
            self.target_framework,
            self.dependency_name,
            self.declared_range,
            self.pinned_dependency_version
        )
    }
}

impl fmt::Display for InvalidRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) -> {} '{}': {}",
            self.package_name,
            self.package_version,
            self.target_framework,
            self.dependency_name,
            self.declared_range,
            self.reason
        )
    }
}
