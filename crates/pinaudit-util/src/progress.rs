//! Terminal feedback for audit runs.
//!
//! Status lines go to stderr with a right-aligned coloured label, the way
//! Cargo prints `Compiling`. The two long phases of an audit get their own
//! indicators: [`ClosureProgress`] for the closure walk, whose length is not
//! known up front, and [`AssemblyProgress`] for the assembly inventory, which
//! visits every closure package exactly once.

use std::io::Write;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
#[cfg(test)]
use indicatif::ProgressDrawTarget;

const LABEL_WIDTH: usize = 12;

/// Severity of a status line; picks the label colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    /// Something was done (`Resolved`, `Wrote`).
    Action,
    /// A count or fact worth showing (`Assemblies`).
    Info,
    /// Something the user should look at (`Conflicts`, `Unpinned`).
    Warn,
}

impl Tone {
    fn style(self) -> Style {
        let style = Style::new().bold();
        match self {
            Tone::Action => style.green(),
            Tone::Info => style.cyan(),
            Tone::Warn => style.yellow(),
        }
    }
}

/// Render one status line without the trailing newline.
fn format_status(tone: Tone, label: &str, message: &str) -> String {
    format!(
        "{:>width$} {message}",
        tone.style().apply_to(label),
        width = LABEL_WIDTH
    )
}

fn emit(tone: Tone, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{}", format_status(tone, label, message));
}

/// `    Auditing 3 root packages against 41 pins`
pub fn status(label: &str, message: &str) {
    emit(Tone::Action, label, message);
}

pub fn status_info(label: &str, message: &str) {
    emit(Tone::Info, label, message);
}

pub fn status_warn(label: &str, message: &str) {
    emit(Tone::Warn, label, message);
}

/// Spinner shown while the closure of the root list is walked.
///
/// Each dequeued package bumps the visit counter and replaces the message
/// with the package name and how many roots it is currently attributed to.
pub struct ClosureProgress {
    bar: ProgressBar,
}

impl ClosureProgress {
    pub fn start(roots: usize) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.enable_steady_tick(Duration::from_millis(80));
        Self::with_bar(bar, roots)
    }

    #[cfg(test)]
    fn hidden(roots: usize) -> Self {
        Self::with_bar(ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden()), roots)
    }

    fn with_bar(bar: ProgressBar, roots: usize) -> Self {
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} Resolving {msg} [{pos} visits]")
                .expect("valid template"),
        );
        bar.set_message(format!(
            "closure of {roots} root{}",
            if roots == 1 { "" } else { "s" }
        ));
        Self { bar }
    }

    /// Record one dequeue of `package`, reached from `roots` roots so far.
    pub fn visit(&self, package: &str, roots: usize) {
        self.bar.inc(1);
        self.bar.set_message(format!("{package} (from {roots})"));
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

/// Bar over the closure packages while their assemblies are collected.
pub struct AssemblyProgress {
    bar: ProgressBar,
}

impl AssemblyProgress {
    pub fn start(packages: usize) -> Self {
        Self::with_bar(ProgressBar::new(packages as u64))
    }

    #[cfg(test)]
    fn hidden(packages: usize) -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            Some(packages as u64),
            ProgressDrawTarget::hidden(),
        ))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>12.cyan.bold} [{bar:30}] {pos}/{len} {wide_msg}")
                .expect("valid template")
                .progress_chars("#>-"),
        );
        bar.set_prefix("Collecting");
        Self { bar }
    }

    /// Mark `package` as the one whose assemblies are being queried.
    pub fn collecting(&self, package: &str) {
        self.bar.set_message(package.to_string());
        self.bar.inc(1);
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}
