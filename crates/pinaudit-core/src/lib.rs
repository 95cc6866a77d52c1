//! Core data types for pinaudit.
//!
//! This crate defines the inputs of a dependency audit: packages and their
//! pins, the central version manifest, the root package list, the contract a
//! dependency metadata source fulfils, and the audit configuration.
//!
//! This crate is intentionally free of network I/O.

/// Name of the optional configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pinaudit.toml";

pub mod config;
pub mod manifest;
pub mod package;
pub mod roots;
pub mod source;
