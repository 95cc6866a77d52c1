use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all pinaudit operations.
#[derive(Debug, Error, Diagnostic)]
pub enum AuditError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable `pinaudit.toml`.
    #[error("Config error: {message}")]
    #[diagnostic(help("Check pinaudit.toml for syntax errors"))]
    Config { message: String },

    /// The version manifest or root list could not be read.
    #[error("Input error: {message}")]
    Input { message: String },

    /// A declared version range does not use a recognized interval notation.
    #[error("Malformed version range '{range}': {reason}")]
    #[diagnostic(help(
        "Recognized forms are (lo, hi), [lo, hi), [lo, hi], (, hi), [lo, ) and [v]; \
         set `on-malformed-range = \"record\"` to keep auditing past bad declarations"
    ))]
    MalformedRange { range: String, reason: String },

    /// A query against the dependency metadata source failed.
    #[error("Metadata query failed: {message}")]
    Query { message: String },

    /// Network request failed or the HTTP client could not be built.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Writing a report file failed.
    #[error("Report error: {message}")]
    Report { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}
