//! Assembly inventory of a closure: which assemblies each pinned package ships.

use std::collections::BTreeSet;

use pinaudit_core::package::Package;
use pinaudit_core::source::DependencySource;

use crate::closure::Closure;

/// An assembly shipped by a pinned package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssemblyRecord {
    pub package_name: String,
    pub package_version: String,
    pub assembly_name: String,
    pub assembly_version: String,
    pub library_path: String,
}

/// Query the assemblies of every pinned package in `closure`.
///
/// Unpinned packages are skipped; the result is deduplicated and ordered by
/// package, then assembly.
pub fn collect_assemblies<S, F>(
    source: &S,
    closure: &Closure,
    mut on_package: F,
) -> miette::Result<BTreeSet<AssemblyRecord>>
where
    S: DependencySource + ?Sized,
    F: FnMut(&Package),
{
    let mut records = BTreeSet::new();
    for entry in closure.packages.values() {
        let package = &entry.package;
        on_package(package);
        if !package.is_pinned() {
            continue;
        }
        let rows = source.fetch_assemblies(&package.name, &package.pinned_version)?;
        tracing::debug!(package = %package.name, assemblies = rows.len(), "fetched assemblies");
        records.extend(rows.into_iter().map(|row| AssemblyRecord {
            package_name: package.name.clone(),
            package_version: package.pinned_version.clone(),
            assembly_name: row.assembly_name,
            assembly_version: row.assembly_version,
            library_path: row.library_directory_path,
        }));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::ClosureBuilder;
    use pinaudit_core::manifest::PinManifest;
    use pinaudit_core::source::MetadataTables;

    #[test]
    fn collects_for_pinned_packages_only() {
        let pins: PinManifest = [("App", "1.0.0"), ("Lib", "2.0.0")]
            .into_iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();
        let source = MetadataTables::new()
            .with_dependency("App", "1.0.0", "net8.0", "Lib", "[2.0.0, )")
            .with_dependency("App", "1.0.0", "net8.0", "Ghost", "[1.0.0, )")
            .with_assembly("Lib", "2.0.0", "Lib.dll", "2.0.0.0", "lib/net8.0")
            .with_assembly("Lib", "2.0.0", "Lib.dll", "2.0.0.0", "lib/net8.0")
            .with_assembly("Lib", "2.0.0", "Lib.dll", "2.0.0.0", "lib/netstandard2.0")
            .with_assembly("Ghost", "", "Ghost.dll", "1.0.0.0", "lib");
        let closure = ClosureBuilder::new(&source, &pins)
            .build(&["App".to_string()])
            .unwrap();

        let mut visited = Vec::new();
        let records = collect_assemblies(&source, &closure, |p| visited.push(p.name.clone())).unwrap();

        assert_eq!(visited, ["App", "Ghost", "Lib"]);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.package_name == "Lib"));
        let paths: Vec<_> = records.iter().map(|r| r.library_path.as_str()).collect();
        assert_eq!(paths, ["lib/net8.0", "lib/netstandard2.0"]);
    }
}
