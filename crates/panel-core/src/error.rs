//! Error types for the normalization engine.
//!
//! Only irrecoverable input is an error here. Ambiguous structure falls back
//! to documented defaults and unparseable values become missing.

use thiserror::Error;

/// Irrecoverable normalization failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No extract could be classified.
    #[error("no usable extracts")]
    NoUsableExtracts,

    /// Reconciliation left no entity in either panel.
    #[error("no entities left to merge after reconciliation")]
    NothingToMerge,

    /// None of the period labels of a sheet canonicalize to a month.
    #[error("no parseable date axis in {source_name}")]
    NoDateAxis { source_name: String },

    /// A required section row is absent.
    #[error("missing primary section '{label}'")]
    MissingPrimarySection { label: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;
