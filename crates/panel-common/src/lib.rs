//! Shared utilities for panel crates.

pub mod format;

pub use format::{format_amount, format_ratio};
