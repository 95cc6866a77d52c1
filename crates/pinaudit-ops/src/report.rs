//! CSV reports of a finished closure.
//!
//! Each report is a header row followed by data rows in set order, so two runs
//! over the same inputs produce byte-identical files. Fields containing commas
//! (joined root names, parse failure reasons) are quoted. The `VersionRange`
//! column of the conflict and invalid-range reports is always quoted, `[2.0]`
//! included, so readers can treat it as an opaque string.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use pinaudit_core::config::OutputConfig;
use pinaudit_resolver::assembly::AssemblyRecord;
use pinaudit_resolver::closure::Closure;
use pinaudit_resolver::conflict::{ConflictReport, InvalidRange};
use pinaudit_util::errors::AuditError;

const ROOTS_SEPARATOR: &str = ", ";

fn report_err(e: impl std::fmt::Display) -> AuditError {
    AuditError::Report {
        message: e.to_string(),
    }
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Writer for rows that carry a declared range. Quoting is done per field by
/// [`cell`] and [`quoted`], since the range column is quoted unconditionally.
fn range_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn cell(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quoted(field)
    } else {
        field.to_string()
    }
}

fn finish<W: Write>(mut wtr: csv::Writer<W>) -> miette::Result<()> {
    wtr.flush().map_err(report_err)?;
    Ok(())
}

/// Roots a package is attributed to, joined for a single cell.
fn joined_roots(closure: &Closure, name: &str) -> String {
    closure
        .roots_of(name)
        .map(|roots| {
            roots
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(ROOTS_SEPARATOR)
        })
        .unwrap_or_default()
}

/// `PackageName,PackageVersion[,RootPackages]`
pub fn write_packages<W: Write>(out: W, closure: &Closure, include_roots: bool) -> miette::Result<()> {
    let mut wtr = writer(out);
    let header = if include_roots {
        wtr.write_record(["PackageName", "PackageVersion", "RootPackages"])
    } else {
        wtr.write_record(["PackageName", "PackageVersion"])
    };
    header.map_err(report_err)?;

    for (name, entry) in &closure.packages {
        let version = entry.package.pinned_version.as_str();
        let row = if include_roots {
            let roots = joined_roots(closure, name);
            wtr.write_record([name.as_str(), version, roots.as_str()])
        } else {
            wtr.write_record([name.as_str(), version])
        };
        row.map_err(report_err)?;
    }
    finish(wtr)
}

/// `PackageName,PackageVersion,DllName,DllVersion,LibraryDirectoryPath[,RootPackages]`
pub fn write_assemblies<W: Write>(
    out: W,
    records: &BTreeSet<AssemblyRecord>,
    closure: &Closure,
    include_roots: bool,
) -> miette::Result<()> {
    let mut wtr = writer(out);
    let mut header = vec![
        "PackageName",
        "PackageVersion",
        "DllName",
        "DllVersion",
        "LibraryDirectoryPath",
    ];
    if include_roots {
        header.push("RootPackages");
    }
    wtr.write_record(&header).map_err(report_err)?;

    for record in records {
        let mut row = vec![
            record.package_name.clone(),
            record.package_version.clone(),
            record.assembly_name.clone(),
            record.assembly_version.clone(),
            record.library_path.clone(),
        ];
        if include_roots {
            row.push(joined_roots(closure, &record.package_name));
        }
        wtr.write_record(&row).map_err(report_err)?;
    }
    finish(wtr)
}

/// `TargetFramework,PackageName,PackageVersion,DependencyName,VersionRange,DependencyVersion`
pub fn write_conflicts<W: Write>(out: W, conflicts: &ConflictReport) -> miette::Result<()> {
    let mut wtr = range_writer(out);
    wtr.write_record([
        "TargetFramework",
        "PackageName",
        "PackageVersion",
        "DependencyName",
        "VersionRange",
        "DependencyVersion",
    ])
    .map_err(report_err)?;
    for c in conflicts.iter() {
        wtr.write_record([
            cell(&c.target_framework),
            cell(&c.package_name),
            cell(&c.package_version),
            cell(&c.dependency_name),
            quoted(&c.declared_range),
            cell(&c.pinned_dependency_version),
        ])
        .map_err(report_err)?;
    }
    finish(wtr)
}

/// `PackageName`, one unpinned package per row.
pub fn write_missing<W: Write>(out: W, missing: &BTreeSet<String>) -> miette::Result<()> {
    let mut wtr = writer(out);
    wtr.write_record(["PackageName"]).map_err(report_err)?;
    for name in missing {
        wtr.write_record([name]).map_err(report_err)?;
    }
    finish(wtr)
}

/// `TargetFramework,PackageName,PackageVersion,DependencyName,VersionRange,Reason`
pub fn write_invalid_ranges<W: Write>(out: W, invalid: &BTreeSet<InvalidRange>) -> miette::Result<()> {
    let mut wtr = range_writer(out);
    wtr.write_record([
        "TargetFramework",
        "PackageName",
        "PackageVersion",
        "DependencyName",
        "VersionRange",
        "Reason",
    ])
    .map_err(report_err)?;
    for r in invalid {
        wtr.write_record([
            cell(&r.target_framework),
            cell(&r.package_name),
            cell(&r.package_version),
            cell(&r.dependency_name),
            quoted(&r.declared_range),
            cell(&r.reason),
        ])
        .map_err(report_err)?;
    }
    finish(wtr)
}

/// Paths of the report files written by [`write_all`].
#[derive(Debug, Default)]
pub struct WrittenReports {
    pub packages: PathBuf,
    pub assemblies: Option<PathBuf>,
    pub conflicts: PathBuf,
    pub missing: PathBuf,
    pub invalid_ranges: PathBuf,
}

impl WrittenReports {
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        [
            Some(&self.packages),
            self.assemblies.as_ref(),
            Some(&self.conflicts),
            Some(&self.missing),
            Some(&self.invalid_ranges),
        ]
        .into_iter()
        .flatten()
        .map(PathBuf::as_path)
    }
}

fn create(path: &Path) -> miette::Result<BufWriter<File>> {
    let file = File::create(path)
        .map_err(|e| report_err(format!("Failed to create {}: {e}", path.display())))?;
    Ok(BufWriter::new(file))
}

/// Write every report into `dir`, named per `names`.
///
/// The assembly report is skipped when `assemblies` is `None`.
pub fn write_all(
    dir: &Path,
    names: &OutputConfig,
    closure: &Closure,
    assemblies: Option<&BTreeSet<AssemblyRecord>>,
    include_roots: bool,
) -> miette::Result<WrittenReports> {
    pinaudit_util::fs::ensure_dir(dir)
        .map_err(|e| report_err(format!("Failed to create {}: {e}", dir.display())))?;

    let mut written = WrittenReports {
        packages: dir.join(&names.packages),
        conflicts: dir.join(&names.conflicts),
        missing: dir.join(&names.missing),
        invalid_ranges: dir.join(&names.invalid_ranges),
        ..WrittenReports::default()
    };

    write_packages(create(&written.packages)?, closure, include_roots)?;
    if let Some(records) = assemblies {
        let path = dir.join(&names.assemblies);
        write_assemblies(create(&path)?, records, closure, include_roots)?;
        written.assemblies = Some(path);
    }
    write_conflicts(create(&written.conflicts)?, &closure.conflicts)?;
    write_missing(create(&written.missing)?, &closure.missing)?;
    write_invalid_ranges(create(&written.invalid_ranges)?, &closure.invalid_ranges)?;

    for path in written.paths() {
        tracing::debug!(path = %path.display(), "wrote report");
    }
    Ok(written)
}
