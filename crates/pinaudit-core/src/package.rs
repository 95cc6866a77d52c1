use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A package identified by name, carrying the version pinned for it.
///
/// Identity is the name alone: the pin is looked up once and attached, so two
/// `Package` values with the same name are the same package even if their
/// versions differ.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    /// Version from the central manifest; empty when the package has no pin.
    pub pinned_version: String,
}

impl Package {
    pub fn new(name: impl Into<String>, pinned_version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pinned_version: pinned_version.into(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        !self.pinned_version.is_empty()
    }
}

impl PartialEq for Package {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Package {}

impl Hash for Package {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl Ord for Package {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for Package {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pinned() {
            write!(f, "{} {}", self.name, self.pinned_version)
        } else {
            write!(f, "{} (unpinned)", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn identity_ignores_version() {
        let a = Package::new("Lib", "1.0.0");
        let b = Package::new("Lib", "2.0.0");
        assert_eq!(a, b);

        let mut set = BTreeSet::new();
        set.insert(a);
        assert!(!set.insert(b));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn display() {
        assert_eq!(Package::new("App", "1.0.0").to_string(), "App 1.0.0");
        assert_eq!(Package::new("App", "").to_string(), "App (unpinned)");
    }
}
