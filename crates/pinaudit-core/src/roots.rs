//! Root package list: one package name per line.

use std::collections::HashSet;
use std::path::Path;

/// Ordered, duplicate-free list of root package names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootList {
    names: Vec<String>,
}

impl RootList {
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = pinaudit_util::fs::read_input(path, "root list")?;
        Ok(Self::parse_str(&content))
    }

    /// Parse a root list. Lines are trimmed; blank lines and `#` comments are
    /// ignored; a name listed twice is kept once, at its first position.
    pub fn parse_str(content: &str) -> Self {
        content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<String> for RootList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let names = iter
            .into_iter()
            .filter(|n| seen.insert(n.clone()))
            .collect();
        Self { names }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_skips_blank_lines() {
        let roots = RootList::parse_str("  App  \n\n# services\nWorker\r\n");
        assert_eq!(roots.names(), ["App", "Worker"]);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let roots = RootList::parse_str("B\nA\nB\n");
        assert_eq!(roots.names(), ["B", "A"]);
        assert_eq!(roots.len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(RootList::parse_str("\n  \n").is_empty());
    }
}
