//! CLI argument definitions for pinaudit.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pinaudit",
    version,
    about = "Audit a package dependency closure against centrally pinned versions",
    long_about = "pinaudit walks the transitive dependencies of a list of root packages, \
                  checks every declared version range against the pins in a central \
                  version manifest, and writes CSV reports of packages, assemblies, \
                  conflicts and unpinned packages."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to pinaudit.toml (default: ./pinaudit.toml if present)
    #[arg(long, global = true, env = "PINAUDIT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Input locations shared by every closure-based command.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Root package list, one name per line
    #[arg(long)]
    pub roots: Option<PathBuf>,
    /// Central version manifest (Packages.props)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    /// Read metadata from a JSON snapshot
    #[arg(long, conflicts_with = "url")]
    pub snapshot: Option<PathBuf>,
    /// Query the metadata service at this base URL
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the closure of every root and write the reports
    Audit {
        #[command(flatten)]
        inputs: InputArgs,
        /// Directory to write the reports into
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Skip the assembly inventory
        #[arg(long)]
        no_assemblies: bool,
        /// Abort on the first malformed version range
        #[arg(long)]
        strict: bool,
        /// Exit with an error when any version conflict is found
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Explain why a package is part of the closure
    Why {
        /// Package name
        package: String,
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Display the dependency tree of each root
    Tree {
        /// Show only this root
        #[arg(long)]
        root: Option<String>,
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Check whether a version satisfies a version range
    Range {
        /// Range in interval notation, e.g. "[1.0, 2.0)"
        range: String,
        /// Version to check
        version: String,
    },

    /// Look up pinned versions in the version manifest
    Pin {
        /// Package name
        #[arg(required_unless_present = "all")]
        package: Option<String>,
        /// List every pin
        #[arg(long, conflicts_with = "package")]
        all: bool,
        /// Central version manifest (Packages.props)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
