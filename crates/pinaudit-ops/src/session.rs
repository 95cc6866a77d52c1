//! Shared setup for closure-based operations: configuration, inputs, the
//! metadata source, and the closure walk itself.

use std::path::{Path, PathBuf};

use pinaudit_core::config::{AuditConfig, SourceKind};
use pinaudit_core::manifest::PinManifest;
use pinaudit_core::roots::RootList;
use pinaudit_core::source::DependencySource;
use pinaudit_core::CONFIG_FILE_NAME;
use pinaudit_resolver::closure::{Closure, ClosureBuilder};
use pinaudit_util::errors::AuditError;
use pinaudit_util::fs::find_ancestor_with;
use pinaudit_util::progress::ClosureProgress;

/// Command-line overrides of `[inputs]` and `[source]`.
///
/// Relative paths here are taken against the working directory, not the
/// config file's directory.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub config: Option<PathBuf>,
    pub roots: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub snapshot: Option<PathBuf>,
    pub url: Option<String>,
}

/// Load `pinaudit.toml` and apply `overrides` on top.
///
/// Without an explicit `--config`, the nearest `pinaudit.toml` in `cwd` or
/// its ancestors is used; with none found, defaults rooted at `cwd`.
pub fn load_config(cwd: &Path, overrides: &InputOverrides) -> miette::Result<AuditConfig> {
    let mut config = match &overrides.config {
        Some(path) => AuditConfig::from_path(&cwd.join(path))?,
        None => match find_ancestor_with(cwd, CONFIG_FILE_NAME) {
            Some(dir) => {
                tracing::debug!(dir = %dir.display(), "using config from ancestor directory");
                AuditConfig::discover(&dir)?
            }
            None => AuditConfig::discover(cwd)?,
        },
    };

    if let Some(roots) = &overrides.roots {
        config.inputs.roots = cwd.join(roots);
    }
    if let Some(manifest) = &overrides.manifest {
        config.inputs.manifest = cwd.join(manifest);
    }
    if let Some(snapshot) = &overrides.snapshot {
        config.source.kind = SourceKind::Snapshot;
        config.source.snapshot = cwd.join(snapshot);
    }
    if let Some(url) = &overrides.url {
        config.source.kind = SourceKind::Http;
        config.source.url = Some(url.clone());
    }
    Ok(config)
}

/// Loaded inputs plus an open metadata source.
pub struct Session {
    pub config: AuditConfig,
    pub roots: RootList,
    pub pins: PinManifest,
    source: Box<dyn DependencySource>,
}

impl Session {
    pub fn open(config: AuditConfig) -> miette::Result<Self> {
        let roots = RootList::from_path(&config.roots_path())?;
        if roots.is_empty() {
            return Err(AuditError::Input {
                message: format!("No root packages in {}", config.roots_path().display()),
            }
            .into());
        }
        let pins = PinManifest::from_path(&config.manifest_path())?;
        tracing::debug!(roots = roots.len(), pins = pins.len(), "inputs loaded");

        let source = pinaudit_metadata::open_source(&config)?;
        Ok(Self {
            config,
            roots,
            pins,
            source,
        })
    }

    pub fn source(&self) -> &dyn DependencySource {
        self.source.as_ref()
    }

    /// Walk the closure of every root, reporting progress on a spinner.
    pub fn closure(&self) -> miette::Result<Closure> {
        let progress = ClosureProgress::start(self.roots.len());
        let result = ClosureBuilder::new(self.source(), &self.pins)
            .on_malformed_range(self.config.audit.on_malformed_range)
            .build_with(self.roots.names(), |package, roots| {
                progress.visit(&package.name, roots.len());
            });
        progress.finish();
        result
    }
}
