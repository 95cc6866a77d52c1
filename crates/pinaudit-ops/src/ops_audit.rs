//! Operation: full audit run. Walks the closure of every root, inventories
//! assemblies, and writes the CSV reports.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pinaudit_core::config::MalformedRangePolicy;
use pinaudit_resolver::assembly::{self, AssemblyRecord};
use pinaudit_resolver::closure::Closure;
use pinaudit_util::errors::AuditError;
use pinaudit_util::progress::{self, AssemblyProgress};

use crate::report::{self, WrittenReports};
use crate::session::{self, InputOverrides, Session};

/// Options for `pinaudit audit`.
#[derive(Debug, Default)]
pub struct AuditOptions {
    pub inputs: InputOverrides,
    /// Directory for the reports (overrides `[output] dir`).
    pub out_dir: Option<PathBuf>,
    /// Skip the assembly inventory and its report.
    pub no_assemblies: bool,
    /// Abort on the first malformed range instead of recording it.
    pub strict: bool,
    /// Return an error when any conflict was found.
    pub fail_on_conflict: bool,
}

/// What an audit run produced.
pub struct AuditOutcome {
    pub closure: Closure,
    pub assemblies: Option<BTreeSet<AssemblyRecord>>,
    pub reports: WrittenReports,
}

pub fn audit(cwd: &Path, opts: &AuditOptions) -> miette::Result<AuditOutcome> {
    let mut config = session::load_config(cwd, &opts.inputs)?;
    if let Some(dir) = &opts.out_dir {
        config.output.dir = cwd.join(dir);
    }
    if opts.strict {
        config.audit.on_malformed_range = MalformedRangePolicy::Abort;
    }
    if opts.no_assemblies {
        config.audit.collect_assemblies = false;
    }

    let session = Session::open(config)?;
    progress::status(
        "Auditing",
        &format!(
            "{} root package{} against {} pins",
            session.roots.len(),
            plural(session.roots.len()),
            session.pins.len()
        ),
    );

    let closure = session.closure()?;
    progress::status(
        "Resolved",
        &format!(
            "{} package{} ({} visits)",
            closure.len(),
            plural(closure.len()),
            closure.visits
        ),
    );

    let assemblies = if session.config.audit.collect_assemblies {
        let bar = AssemblyProgress::start(closure.len());
        let records = assembly::collect_assemblies(session.source(), &closure, |package| {
            bar.collecting(&package.name);
        });
        bar.finish();
        Some(records?)
    } else {
        None
    };

    let reports = report::write_all(
        &session.config.output_dir(),
        &session.config.output,
        &closure,
        assemblies.as_ref(),
        session.config.audit.include_roots,
    )?;

    print_summary(&closure, assemblies.as_ref(), &reports);

    if opts.fail_on_conflict && !closure.conflicts.is_empty() {
        return Err(AuditError::Generic {
            message: format!(
                "{} version conflict{} found",
                closure.conflicts.len(),
                plural(closure.conflicts.len())
            ),
        }
        .into());
    }

    Ok(AuditOutcome {
        closure,
        assemblies,
        reports,
    })
}

fn print_summary(
    closure: &Closure,
    assemblies: Option<&BTreeSet<AssemblyRecord>>,
    reports: &WrittenReports,
) {
    if let Some(records) = assemblies {
        progress::status_info("Assemblies", &records.len().to_string());
    }

    if closure.conflicts.is_empty() {
        progress::status_info("Conflicts", "none");
    } else {
        progress::status_warn("Conflicts", &closure.conflicts.len().to_string());
        tracing::warn!(count = closure.conflicts.len(), "declared ranges violated by pins");
    }
    if !closure.missing.is_empty() {
        progress::status_warn(
            "Unpinned",
            &closure
                .missing
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    if !closure.invalid_ranges.is_empty() {
        progress::status_warn(
            "Invalid",
            &format!("{} unparseable range declarations", closure.invalid_ranges.len()),
        );
    }

    for path in reports.paths() {
        progress::status("Wrote", &path.display().to_string());
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
