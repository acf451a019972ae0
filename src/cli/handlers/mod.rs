//! CLI command handlers.

pub mod analyze;
pub mod graph;
pub mod utility;
