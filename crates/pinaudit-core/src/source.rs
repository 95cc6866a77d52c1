//! Contract for the dependency metadata store, plus an in-memory implementation.
//!
//! A source answers two queries keyed by an exact `(name, version)` pair: the
//! dependencies a package version declares (per target framework), and the
//! assemblies it ships. An unknown pair or an empty version yields an empty
//! result rather than an error.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One dependency declared by a package version for one target framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRow {
    pub target_framework: String,
    pub dependency_name: String,
    /// Raw interval text as declared, e.g. `[2.0.0, 3.0.0)`.
    pub dependency_version_range: String,
}

/// One assembly shipped by a package version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyRow {
    pub assembly_name: String,
    pub assembly_version: String,
    pub library_directory_path: String,
}

/// Query interface over the dependency metadata store.
pub trait DependencySource {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>>;

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>>;
}

impl<S: DependencySource + ?Sized> DependencySource for &S {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
        (**self).fetch_dependencies(name, version)
    }

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
        (**self).fetch_assemblies(name, version)
    }
}

impl<S: DependencySource + ?Sized> DependencySource for Box<S> {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
        (**self).fetch_dependencies(name, version)
    }

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
        (**self).fetch_assemblies(name, version)
    }
}

/// A row of the package dependency table, keyed by package name and version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageDependencyEntry {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub row: DependencyRow,
}

/// A row of the package assembly table, keyed by package name and version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageAssemblyEntry {
    pub name: String,
    pub version: String,
    #[serde(flatten)]
    pub row: AssemblyRow,
}

/// On-disk snapshot of both metadata tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    #[serde(default)]
    pub dependencies: Vec<PackageDependencyEntry>,
    #[serde(default)]
    pub assemblies: Vec<PackageAssemblyEntry>,
}

type Key = (String, String);

/// In-memory metadata tables indexed by `(name, version)`.
///
/// Serves offline audits from a snapshot file and acts as the fixture source
/// in tests.
#[derive(Debug, Clone, Default)]
pub struct MetadataTables {
    dependencies: BTreeMap<Key, Vec<DependencyRow>>,
    assemblies: BTreeMap<Key, Vec<AssemblyRow>>,
}

impl MetadataTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load tables from a JSON snapshot file.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = pinaudit_util::fs::read_input(path, "metadata snapshot")?;
        let snapshot: MetadataSnapshot = serde_json::from_str(&content).map_err(|e| {
            pinaudit_util::errors::AuditError::Input {
                message: format!("Failed to parse metadata snapshot {}: {e}", path.display()),
            }
        })?;
        Ok(Self::from(snapshot))
    }

    /// Add a dependency row for `name` at `version`.
    pub fn with_dependency(
        mut self,
        name: &str,
        version: &str,
        target_framework: &str,
        dependency_name: &str,
        range: &str,
    ) -> Self {
        self.dependencies
            .entry((name.to_string(), version.to_string()))
            .or_default()
            .push(DependencyRow {
                target_framework: target_framework.to_string(),
                dependency_name: dependency_name.to_string(),
                dependency_version_range: range.to_string(),
            });
        self
    }

    /// Add an assembly row for `name` at `version`.
    pub fn with_assembly(
        mut self,
        name: &str,
        version: &str,
        assembly_name: &str,
        assembly_version: &str,
        library_path: &str,
    ) -> Self {
        self.assemblies
            .entry((name.to_string(), version.to_string()))
            .or_default()
            .push(AssemblyRow {
                assembly_name: assembly_name.to_string(),
                assembly_version: assembly_version.to_string(),
                library_directory_path: library_path.to_string(),
            });
        self
    }

    /// Number of dependency rows across all packages.
    pub fn dependency_row_count(&self) -> usize {
        self.dependencies.values().map(Vec::len).sum()
    }
}

impl From<MetadataSnapshot> for MetadataTables {
    fn from(snapshot: MetadataSnapshot) -> Self {
        let mut tables = Self::new();
        for entry in snapshot.dependencies {
            tables
                .dependencies
                .entry((entry.name, entry.version))
                .or_default()
                .push(entry.row);
        }
        for entry in snapshot.assemblies {
            tables
                .assemblies
                .entry((entry.name, entry.version))
                .or_default()
                .push(entry.row);
        }
        tables
    }
}

impl DependencySource for MetadataTables {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
        Ok(self
            .dependencies
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
        Ok(self
            .assemblies
            .get(&(name.to_string(), version.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact_on_name_and_version() {
        let tables = MetadataTables::new().with_dependency(
            "App",
            "1.0.0",
            "net8.0",
            "Lib",
            "[2.0.0, 3.0.0)",
        );
        assert_eq!(tables.fetch_dependencies("App", "1.0.0").unwrap().len(), 1);
        assert!(tables.fetch_dependencies("App", "1.0.1").unwrap().is_empty());
        assert!(tables.fetch_dependencies("App", "").unwrap().is_empty());
        assert!(tables.fetch_dependencies("Nope", "1.0.0").unwrap().is_empty());
    }

    #[test]
    fn snapshot_json_uses_table_column_names() {
        let json = r#"{
            "dependencies": [
                {"name": "App", "version": "1.0.0", "targetFramework": "net8.0",
                 "dependencyName": "Lib", "dependencyVersionRange": "[2.0.0, )"}
            ],
            "assemblies": [
                {"name": "Lib", "version": "2.0.0", "assemblyName": "Lib.dll",
                 "assemblyVersion": "2.0.0.0", "libraryDirectoryPath": "lib/net8.0"}
            ]
        }"#;
        let snapshot: MetadataSnapshot = serde_json::from_str(json).unwrap();
        let tables = MetadataTables::from(snapshot);
        let deps = tables.fetch_dependencies("App", "1.0.0").unwrap();
        assert_eq!(deps[0].dependency_name, "Lib");
        assert_eq!(deps[0].dependency_version_range, "[2.0.0, )");
        let asm = tables.fetch_assemblies("Lib", "2.0.0").unwrap();
        assert_eq!(asm[0].library_directory_path, "lib/net8.0");
    }

    #[test]
    fn boxed_source_delegates() {
        let boxed: Box<dyn DependencySource> =
            Box::new(MetadataTables::new().with_assembly("A", "1", "A.dll", "1.0.0.0", "lib"));
        assert_eq!(boxed.fetch_assemblies("A", "1").unwrap().len(), 1);
    }
}
