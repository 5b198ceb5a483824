//! Error types for the panel data model.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing model values or loading configuration.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A (year, month) pair outside the supported calendar.
    #[error("invalid month {year}-{month:02}")]
    InvalidMonth { year: i32, month: u32 },

    /// A month label that could not be parsed.
    #[error("unrecognized month label '{label}'")]
    InvalidMonthLabel { label: String },

    /// Failed to read a configuration file.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {source}")]
    ConfigParse {
        #[source]
        source: toml::de::Error,
    },

    /// Failed to render configuration as TOML.
    #[error("failed to serialize config: {source}")]
    ConfigSerialize {
        #[source]
        source: toml::ser::Error,
    },

    /// Configuration parsed but is not usable.
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
