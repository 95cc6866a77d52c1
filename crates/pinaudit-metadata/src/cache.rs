//! Per-run memoization of metadata queries.
//!
//! The closure walk revisits a package once per root that reaches it, and the
//! assembly pass queries every package again. Answers do not change during a
//! run, so each `(name, version)` pair is fetched at most once per table.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use pinaudit_core::source::{AssemblyRow, DependencyRow, DependencySource};

type Key = (String, String);

pub struct CachedSource<S> {
    inner: S,
    dependencies: RefCell<HashMap<Key, Vec<DependencyRow>>>,
    assemblies: RefCell<HashMap<Key, Vec<AssemblyRow>>>,
    hits: Cell<usize>,
}

impl<S: DependencySource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            dependencies: RefCell::new(HashMap::new()),
            assemblies: RefCell::new(HashMap::new()),
            hits: Cell::new(0),
        }
    }

    /// Queries answered without reaching the inner source.
    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn lookup<T: Clone>(
    map: &RefCell<HashMap<Key, Vec<T>>>,
    hits: &Cell<usize>,
    name: &str,
    version: &str,
    fetch: impl FnOnce() -> miette::Result<Vec<T>>,
) -> miette::Result<Vec<T>> {
    let key = (name.to_string(), version.to_string());
    if let Some(rows) = map.borrow().get(&key) {
        hits.set(hits.get() + 1);
        return Ok(rows.clone());
    }
    // Errors are not cached; the run aborts on the first one anyway.
    let rows = fetch()?;
    map.borrow_mut().insert(key, rows.clone());
    Ok(rows)
}

impl<S: DependencySource> DependencySource for CachedSource<S> {
    fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
        lookup(&self.dependencies, &self.hits, name, version, || {
            self.inner.fetch_dependencies(name, version)
        })
    }

    fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
        lookup(&self.assemblies, &self.hits, name, version, || {
            self.inner.fetch_assemblies(name, version)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinaudit_core::source::MetadataTables;

    struct Counting {
        tables: MetadataTables,
        calls: Cell<usize>,
    }

    impl DependencySource for Counting {
        fn fetch_dependencies(&self, name: &str, version: &str) -> miette::Result<Vec<DependencyRow>> {
            self.calls.set(self.calls.get() + 1);
            self.tables.fetch_dependencies(name, version)
        }

        fn fetch_assemblies(&self, name: &str, version: &str) -> miette::Result<Vec<AssemblyRow>> {
            self.calls.set(self.calls.get() + 1);
            self.tables.fetch_assemblies(name, version)
        }
    }

    fn counting() -> Counting {
        Counting {
            tables: MetadataTables::new()
                .with_dependency("App", "1.0", "net8.0", "Lib", "[1.0, )")
                .with_assembly("Lib", "1.0", "Lib.dll", "1.0.0.0", "lib/net8.0"),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn repeated_queries_hit_the_cache() {
        let cached = CachedSource::new(counting());
        for _ in 0..3 {
            let rows = cached.fetch_dependencies("App", "1.0").unwrap();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].dependency_name, "Lib");
        }
        assert_eq!(cached.hits(), 2);
        assert_eq!(cached.into_inner().calls.get(), 1);
    }

    #[test]
    fn tables_and_versions_are_cached_separately() {
        let cached = CachedSource::new(counting());
        assert_eq!(cached.fetch_dependencies("Lib", "1.0").unwrap().len(), 0);
        assert_eq!(cached.fetch_assemblies("Lib", "1.0").unwrap().len(), 1);
        assert_eq!(cached.fetch_assemblies("Lib", "2.0").unwrap().len(), 0);
        assert_eq!(cached.hits(), 0);
        assert_eq!(cached.into_inner().calls.get(), 3);
    }
}
