//! Operation: look up pins in the version manifest.

use std::path::Path;

use pinaudit_core::manifest::PinManifest;
use pinaudit_util::errors::AuditError;

use crate::session::{self, InputOverrides};

/// What to show from the manifest.
#[derive(Debug, Clone)]
pub enum PinQuery {
    One(String),
    All,
}

pub fn pin(cwd: &Path, inputs: &InputOverrides, query: &PinQuery) -> miette::Result<()> {
    let config = session::load_config(cwd, inputs)?;
    let path = config.manifest_path();
    let pins = PinManifest::from_path(&path)?;

    match query {
        PinQuery::All => {
            for (name, version) in pins.iter() {
                println!("{name} {version}");
            }
            tracing::debug!(count = pins.len(), "listed pins");
        }
        PinQuery::One(name) => {
            if !pins.contains(name) {
                return Err(AuditError::Generic {
                    message: format!("'{name}' has no pin in {}", path.display()),
                }
                .into());
            }
            println!("{name} {}", pins.resolve(name));
        }
    }
    Ok(())
}
