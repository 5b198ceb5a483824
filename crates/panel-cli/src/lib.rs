//! CLI library components for the panel normalizer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
