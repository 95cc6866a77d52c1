//! Command dispatch and handler modules.

mod audit;
mod pin;
mod range;
mod tree;
mod why;

use std::path::PathBuf;

use miette::Result;

use pinaudit_ops::session::InputOverrides;
use pinaudit_util::errors::AuditError;

use crate::cli::{Cli, Command, InputArgs};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    tracing::debug!(command = ?cli.command, "dispatching");
    let config = cli.config;
    match cli.command {
        Command::Audit {
            inputs,
            out_dir,
            no_assemblies,
            strict,
            fail_on_conflict,
        } => audit::exec(
            overrides(config, inputs),
            out_dir,
            no_assemblies,
            strict,
            fail_on_conflict,
        ),
        Command::Why { package, inputs } => why::exec(overrides(config, inputs), &package),
        Command::Tree {
            root,
            depth,
            inputs,
        } => tree::exec(overrides(config, inputs), root, depth),
        Command::Range { range, version } => range::exec(&range, &version),
        Command::Pin {
            package,
            all,
            manifest,
        } => {
            let inputs = InputArgs {
                manifest,
                ..InputArgs::default()
            };
            pin::exec(overrides(config, inputs), package, all)
        }
    }
}

fn overrides(config: Option<PathBuf>, inputs: InputArgs) -> InputOverrides {
    InputOverrides {
        config,
        roots: inputs.roots,
        manifest: inputs.manifest,
        snapshot: inputs.snapshot,
        url: inputs.url,
    }
}

fn current_dir() -> Result<PathBuf> {
    Ok(std::env::current_dir().map_err(AuditError::Io)?)
}
