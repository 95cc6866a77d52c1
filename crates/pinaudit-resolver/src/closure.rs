//! Dependency closure with multi-root attribution.
//!
//! Every reached package carries the set of roots that transitively depend on
//! it. The walk is a fixed-point worklist over those sets: a package is pushed
//! whenever its root set grows, never because it was merely seen. A package
//! reached first from one root and later from another is therefore processed
//! again so the new root flows on to everything below it. Each set is bounded
//! by the number of roots and only grows, so the walk terminates on cyclic
//! graphs too.

use std::collections::{BTreeMap, BTreeSet};

use pinaudit_core::config::MalformedRangePolicy;
use pinaudit_core::manifest::PinManifest;
use pinaudit_core::package::Package;
use pinaudit_core::source::{DependencyRow, DependencySource};
use pinaudit_util::errors::AuditError;

use crate::conflict::{Conflict, ConflictReport, InvalidRange};
use crate::version::VersionInterval;

/// Names of the roots a package is attributed to.
pub type RootSet = BTreeSet<String>;

/// One dependency declaration row, as seen from the consuming package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DependencyEdge {
    pub from_package: String,
    pub from_version: String,
    pub target_framework: String,
    pub to_package: String,
    pub declared_range: String,
}

/// A reached package and the roots it is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosurePackage {
    pub package: Package,
    pub roots: RootSet,
}

/// The fixed point of a closure walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Root names in input order.
    pub roots: Vec<String>,
    pub packages: BTreeMap<String, ClosurePackage>,
    pub edges: BTreeSet<DependencyEdge>,
    pub conflicts: ConflictReport,
    /// Reached packages without a pin in the manifest.
    pub missing: BTreeSet<String>,
    pub invalid_ranges: BTreeSet<InvalidRange>,
    /// Number of dequeues, including re-visits after root-set growth.
    pub visits: usize,
}

impl Closure {
    pub fn package(&self, name: &str) -> Option<&ClosurePackage> {
        self.packages.get(name)
    }

    pub fn roots_of(&self, name: &str) -> Option<&RootSet> {
        self.packages.get(name).map(|p| &p.roots)
    }

    pub fn is_root(&self, name: &str) -> bool {
        self.roots.iter().any(|r| r == name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

/// Computes the [`Closure`] of a set of roots against a metadata source and a
/// version manifest.
pub struct ClosureBuilder<'a, S: ?Sized> {
    source: &'a S,
    pins: &'a PinManifest,
    policy: MalformedRangePolicy,
}

impl<'a, S: DependencySource + ?Sized> ClosureBuilder<'a, S> {
    pub fn new(source: &'a S, pins: &'a PinManifest) -> Self {
        Self {
            source,
            pins,
            policy: MalformedRangePolicy::default(),
        }
    }

    /// Choose whether an unparseable range aborts the walk or is recorded.
    pub fn on_malformed_range(mut self, policy: MalformedRangePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(&self, roots: &[String]) -> miette::Result<Closure> {
        self.build_with(roots, |_, _| {})
    }

    /// Like [`ClosureBuilder::build`], calling `on_visit` for every package
    /// taken off the worklist.
    pub fn build_with<F>(&self, roots: &[String], mut on_visit: F) -> miette::Result<Closure>
    where
        F: FnMut(&Package, &RootSet),
    {
        let mut walk = Walk::default();
        for name in roots {
            walk.seed(name, self.pins.resolve(name));
        }

        while let Some(name) = walk.worklist.pop() {
            let package = walk.packages[&name].clone();
            let reached_from = walk.attribution[&name].clone();
            walk.visits += 1;

            tracing::info!(
                package = %package.name,
                version = %package.pinned_version,
                roots = reached_from.len(),
                "processing"
            );
            on_visit(&package, &reached_from);

            if !package.is_pinned() {
                continue;
            }

            let rows = self
                .source
                .fetch_dependencies(&package.name, &package.pinned_version)?;
            tracing::debug!(package = %package.name, rows = rows.len(), "fetched dependencies");

            for row in &rows {
                self.process_row(&mut walk, &package, &reached_from, row)?;
            }
        }

        Ok(walk.finish(roots))
    }

    fn process_row(
        &self,
        walk: &mut Walk,
        package: &Package,
        reached_from: &RootSet,
        row: &DependencyRow,
    ) -> miette::Result<()> {
        let dep_name = row.dependency_name.as_str();
        let dep_version = self.pins.resolve(dep_name);

        walk.edges.insert(DependencyEdge {
            from_package: package.name.clone(),
            from_version: package.pinned_version.clone(),
            target_framework: row.target_framework.clone(),
            to_package: dep_name.to_string(),
            declared_range: row.dependency_version_range.clone(),
        });

        if dep_version.is_empty() {
            walk.missing.insert(dep_name.to_string());
        } else {
            self.check_range(walk, package, row, dep_version)?;
        }

        walk.packages
            .entry(dep_name.to_string())
            .or_insert_with(|| Package::new(dep_name, dep_version));

        let set = walk.attribution.entry(dep_name.to_string()).or_default();
        let before = set.len();
        set.extend(reached_from.iter().cloned());
        if set.len() > before {
            walk.worklist.push(dep_name.to_string());
        }
        Ok(())
    }

    fn check_range(
        &self,
        walk: &mut Walk,
        package: &Package,
        row: &DependencyRow,
        dep_version: &str,
    ) -> miette::Result<()> {
        let verdict = VersionInterval::parse(&row.dependency_version_range)
            .and_then(|range| range.contains_str(dep_version));

        match verdict {
            Ok(true) => {}
            Ok(false) => {
                let conflict = Conflict {
                    target_framework: row.target_framework.clone(),
                    package_name: package.name.clone(),
                    package_version: package.pinned_version.clone(),
                    dependency_name: row.dependency_name.clone(),
                    declared_range: row.dependency_version_range.clone(),
                    pinned_dependency_version: dep_version.to_string(),
                };
                if walk.conflicts.add(conflict) {
                    tracing::debug!(
                        package = %package.name,
                        dependency = %row.dependency_name,
                        range = %row.dependency_version_range,
                        pinned = dep_version,
                        "version conflict"
                    );
                }
            }
            Err(err) => match self.policy {
                MalformedRangePolicy::Abort => return Err(AuditError::from(err).into()),
                MalformedRangePolicy::Record => {
                    let invalid = InvalidRange {
                        target_framework: row.target_framework.clone(),
                        package_name: package.name.clone(),
                        package_version: package.pinned_version.clone(),
                        dependency_name: row.dependency_name.clone(),
                        declared_range: row.dependency_version_range.clone(),
                        reason: err.to_string(),
                    };
                    if walk.invalid_ranges.insert(invalid) {
                        tracing::warn!(
                            package = %package.name,
                            dependency = %row.dependency_name,
                            "{err}"
                        );
                    }
                }
            },
        }
        Ok(())
    }
}

/// Mutable state of one walk.
#[derive(Default)]
struct Walk {
    worklist: Vec<String>,
    packages: BTreeMap<String, Package>,
    attribution: BTreeMap<String, RootSet>,
    edges: BTreeSet<DependencyEdge>,
    conflicts: ConflictReport,
    missing: BTreeSet<String>,
    invalid_ranges: BTreeSet<InvalidRange>,
    visits: usize,
}

impl Walk {
    fn seed(&mut self, name: &str, version: &str) {
        if version.is_empty() {
            self.missing.insert(name.to_string());
        }
        self.packages
            .entry(name.to_string())
            .or_insert_with(|| Package::new(name, version));
        if self
            .attribution
            .entry(name.to_string())
            .or_default()
            .insert(name.to_string())
        {
            self.worklist.push(name.to_string());
        }
    }

    fn finish(self, roots: &[String]) -> Closure {
        let mut attribution = self.attribution;
        let packages = self
            .packages
            .into_iter()
            .map(|(name, package)| {
                let roots = attribution.remove(&name).unwrap_or_default();
                (name, ClosurePackage { package, roots })
            })
            .collect();

        let mut seen = BTreeSet::new();
        let roots = roots
            .iter()
            .filter(|r| seen.insert(r.as_str()))
            .cloned()
            .collect();

        Closure {
            roots,
            packages,
            edges: self.edges,
            conflicts: self.conflicts,
            missing: self.missing,
            invalid_ranges: self.invalid_ranges,
            visits: self.visits,
        }
    }
}
