//! Central version manifest (`Packages.props`): one pinned version per package.
//!
//! The manifest is read line by line. A line contributes a pin when it holds a
//! single `PackageVersion` element such as
//!
//! ```xml
//! <PackageVersion Include="Newtonsoft.Json" Version="13.0.3" />
//! <PackageVersion Update="System.Memory" Version="4.5.5" />
//! ```
//!
//! Every other line (item groups, comments, broken markup) is skipped. When a
//! name is pinned more than once the last line wins.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Read-only name to pinned-version table built once per run.
#[derive(Debug, Clone, Default)]
pub struct PinManifest {
    pins: BTreeMap<String, String>,
}

impl PinManifest {
    /// Load and parse a manifest from the given path.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = pinaudit_util::fs::read_input(path, "version manifest")?;
        let manifest = Self::parse_str(&content);
        tracing::debug!(
            path = %path.display(),
            pins = manifest.len(),
            "loaded version manifest"
        );
        Ok(manifest)
    }

    pub fn parse_str(content: &str) -> Self {
        let mut pins = BTreeMap::new();
        for (lineno, line) in content.lines().enumerate() {
            match parse_pin_line(line) {
                Some((name, version)) => {
                    pins.insert(name, version);
                }
                None => tracing::trace!(line = lineno + 1, "no pin on manifest line"),
            }
        }
        Self { pins }
    }

    /// Pinned version of `name`, or the empty string when it has no pin.
    pub fn resolve(&self, name: &str) -> &str {
        self.pins.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// All pins, ordered by package name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pins.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PinManifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pins: iter.into_iter().collect(),
        }
    }
}

fn parse_pin_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if !trimmed.starts_with("<PackageVersion") {
        return None;
    }
    let mut reader = Reader::from_str(trimmed);
    match reader.read_event() {
        Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"PackageVersion" => {
            pin_from_element(&e)
        }
        _ => None,
    }
}

fn pin_from_element(element: &BytesStart<'_>) -> Option<(String, String)> {
    let mut name = None;
    let mut version = None;
    for attr in element.attributes() {
        let attr = attr.ok()?;
        let value = attr.unescape_value().ok()?.trim().to_string();
        match attr.key.as_ref() {
            b"Include" | b"Update" => name = Some(value),
            b"Version" => version = Some(value),
            _ => {}
        }
    }
    match (name, version) {
        (Some(n), Some(v)) if !n.is_empty() && !v.is_empty() => Some((n, v)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_and_update_lines() {
        let manifest = PinManifest::parse_str(
            r#"<Project>
  <ItemGroup>
    <PackageVersion Include="App" Version="1.0.0" />
    <PackageVersion Update="Lib" Version="2.0.0-beta.1" />
  </ItemGroup>
</Project>"#,
        );
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.resolve("App"), "1.0.0");
        assert_eq!(manifest.resolve("Lib"), "2.0.0-beta.1");
    }

    #[test]
    fn unknown_package_resolves_empty() {
        let manifest = PinManifest::parse_str(r#"<PackageVersion Include="App" Version="1.0.0" />"#);
        assert_eq!(manifest.resolve("Other"), "");
        assert!(!manifest.contains("Other"));
    }

    #[test]
    fn last_match_wins() {
        let manifest = PinManifest::parse_str(
            "<PackageVersion Include=\"Lib\" Version=\"1.0.0\" />\n\
             <PackageVersion Update=\"Lib\" Version=\"1.2.0\" />\n",
        );
        assert_eq!(manifest.resolve("Lib"), "1.2.0");
    }

    #[test]
    fn attribute_order_is_free() {
        let manifest =
            PinManifest::parse_str(r#"  <PackageVersion Version="3.1.0" Include="Lib" />  "#);
        assert_eq!(manifest.resolve("Lib"), "3.1.0");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let manifest = PinManifest::parse_str(
            "<PackageVersion Include=\"NoVersion\" />\n\
             <PackageVersion Include=\"Broken Version=\"1.0.0\" />\n\
             <PackageVersion Include=\"\" Version=\"1.0.0\" />\n\
             <PackageReference Include=\"Ref\" Version=\"1.0.0\" />\n\
             <!-- <PackageVersion Include=\"Commented\" Version=\"1.0.0\" /> -->\n\
             <PackageVersion Include=\"Good\" Version=\"4.0.0\" />\n",
        );
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.resolve("Good"), "4.0.0");
    }
}
