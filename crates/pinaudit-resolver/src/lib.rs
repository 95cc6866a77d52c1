//! Dependency closure engine: version-interval parsing and matching, the
//! multi-root closure walk, conflict detection, assembly inventory, and the
//! package graph used for path and tree queries.

pub mod assembly;
pub mod closure;
pub mod conflict;
pub mod graph;
pub mod version;
