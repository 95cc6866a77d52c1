use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use pinaudit_util::errors::AuditError;

/// Audit configuration loaded from `pinaudit.toml`.
///
/// Every key is optional; defaults match the conventional file names so a
/// directory holding `roots.txt`, `Packages.props` and `metadata.json` needs
/// no configuration at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default)]
    pub inputs: InputsConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub audit: AuditOptionsConfig,

    /// Directory relative paths are resolved against (the config file's
    /// directory, or the working directory when there is no file).
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Input files from `[inputs]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    #[serde(default = "default_roots")]
    pub roots: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            manifest: default_manifest(),
        }
    }
}

fn default_roots() -> PathBuf {
    PathBuf::from("roots.txt")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("Packages.props")
}

/// Which metadata backend answers dependency and assembly queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// A JSON dump of both metadata tables.
    #[default]
    Snapshot,
    /// The remote metadata service.
    Http,
}

/// Metadata source settings from `[source]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,
    #[serde(default)]
    pub url: Option<String>,
    /// Name of the environment variable holding a bearer token (or the
    /// password when `username` is set).
    #[serde(default = "default_token_env", rename = "token-env")]
    pub token_env: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default = "default_timeout_secs", rename = "timeout-secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            snapshot: default_snapshot(),
            url: None,
            token_env: default_token_env(),
            username: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

fn default_snapshot() -> PathBuf {
    PathBuf::from("metadata.json")
}

fn default_token_env() -> String {
    "PINAUDIT_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retries() -> u32 {
    3
}

/// Report file names from `[output]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_packages_file")]
    pub packages: String,
    #[serde(default = "default_assemblies_file")]
    pub assemblies: String,
    #[serde(default = "default_conflicts_file")]
    pub conflicts: String,
    #[serde(default = "default_missing_file")]
    pub missing: String,
    #[serde(default = "default_invalid_ranges_file", rename = "invalid-ranges")]
    pub invalid_ranges: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            packages: default_packages_file(),
            assemblies: default_assemblies_file(),
            conflicts: default_conflicts_file(),
            missing: default_missing_file(),
            invalid_ranges: default_invalid_ranges_file(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_packages_file() -> String {
    "Packages.csv".to_string()
}

fn default_assemblies_file() -> String {
    "DllInfo.csv".to_string()
}

fn default_conflicts_file() -> String {
    "VersionConflicts.csv".to_string()
}

fn default_missing_file() -> String {
    "MissingVersions.csv".to_string()
}

fn default_invalid_ranges_file() -> String {
    "InvalidRanges.csv".to_string()
}

/// What to do when a declared range cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRangePolicy {
    /// Stop the whole run with an error.
    Abort,
    /// Record the declaration in the invalid-range report and keep going.
    #[default]
    Record,
}

/// Behaviour switches from `[audit]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditOptionsConfig {
    #[serde(default, rename = "on-malformed-range")]
    pub on_malformed_range: MalformedRangePolicy,
    #[serde(default = "default_true", rename = "include-roots")]
    pub include_roots: bool,
    #[serde(default = "default_true", rename = "collect-assemblies")]
    pub collect_assemblies: bool,
}

impl Default for AuditOptionsConfig {
    fn default() -> Self {
        Self {
            on_malformed_range: MalformedRangePolicy::default(),
            include_roots: true,
            collect_assemblies: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl AuditConfig {
    /// Load configuration from a TOML file. Relative paths inside it are
    /// resolved against the file's directory.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AuditError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let mut config = Self::parse_toml(&content)?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    pub fn parse_toml(content: &str) -> miette::Result<Self> {
        toml::from_str(content).map_err(|e| {
            AuditError::Config {
                message: format!("Failed to parse config: {e}"),
            }
            .into()
        })
    }

    /// Load `pinaudit.toml` from `dir` if present, otherwise return defaults
    /// rooted at `dir`.
    pub fn discover(dir: &Path) -> miette::Result<Self> {
        let path = dir.join(crate::CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_path(&path)
        } else {
            Ok(Self {
                base_dir: dir.to_path_buf(),
                ..Self::default()
            })
        }
    }

    /// Resolve a configured path against [`AuditConfig::base_dir`].
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn roots_path(&self) -> PathBuf {
        self.resolve(&self.inputs.roots)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.inputs.manifest)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.resolve(&self.source.snapshot)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.output.dir)
    }
}
