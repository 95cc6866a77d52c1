//! Dependency metadata backends.
//!
//! The remote metadata service is reached over HTTP ([`http::HttpSource`]),
//! with credentials applied by [`auth`] and repeated `(name, version)` queries
//! served from [`cache::CachedSource`]. [`open_source`] picks the backend named
//! in the configuration.

pub mod auth;
pub mod cache;
pub mod http;

use pinaudit_core::config::{AuditConfig, SourceKind};
use pinaudit_core::source::{DependencySource, MetadataTables};

use crate::cache::CachedSource;
use crate::http::HttpSource;

/// Open the metadata source described by `config`.
pub fn open_source(config: &AuditConfig) -> miette::Result<Box<dyn DependencySource>> {
    match config.source.kind {
        SourceKind::Snapshot => {
            let path = config.snapshot_path();
            let tables = MetadataTables::from_path(&path)?;
            tracing::debug!(
                path = %path.display(),
                rows = tables.dependency_row_count(),
                "loaded metadata snapshot"
            );
            Ok(Box::new(tables))
        }
        SourceKind::Http => {
            let source = HttpSource::from_config(&config.source)?;
            Ok(Box::new(CachedSource::new(source)))
        }
    }
}
