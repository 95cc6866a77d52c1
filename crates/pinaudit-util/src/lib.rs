//! Shared utilities for pinaudit.
//!
//! This crate provides cross-cutting concerns used by all other pinaudit
//! crates: the unified error type, filesystem helpers, and terminal status
//! lines and spinners.

pub mod errors;
pub mod fs;
pub mod progress;
