//! Extract ingestion.
//!
//! This crate discovers monthly extract files by name and reads them into the
//! panel model's raw types.
//!
//! # Features
//!
//! - **Discovery**: classify `YYYY-MM.csv` / `<prefix>YYYY-MM.csv` files by source and period
//! - **CSV Loading**: read ragged CSV records into [`RawExtract`](panel_model::RawExtract)
//!   using the header layout of each source
//! - **Wide Sheets**: read a CSV sheet export into [`WideSheet`](panel_model::WideSheet)
//! - **Batch Loading**: read every discovered extract, skipping unreadable files
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use panel_ingest::load_extracts;
//! use panel_model::EngineConfig;
//!
//! let config = EngineConfig::default();
//! let batch = load_extracts(Path::new("raw"), &config.files)?;
//! println!("{} extracts, {} skipped", batch.extracts.len(), batch.skipped.len());
//! ```

mod batch;
mod discovery;
mod error;
mod reader;
mod sheet;

// === Error Types ===
pub use error::{IngestError, Result};

// === File Discovery ===
pub use discovery::{
    DiscoveredExtracts, ExtractFile, FileClassifier, discover_extracts, list_csv_files,
};

// === CSV Reading ===
pub use reader::{NATIONAL_HEADER_LINE, REGIONAL_HEADER_LINE, read_extract, read_records};

// === Wide Sheets ===
pub use sheet::read_wide_sheet;

// === Batch Loading ===
pub use batch::{ExtractBatch, SkippedFile, load_extracts};
