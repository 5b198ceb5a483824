//! Batch loading of a raw data folder.

use std::path::{Path, PathBuf};

use panel_model::{FileConfig, RawExtract, SourceKind};

use crate::discovery::discover_extracts;
use crate::error::Result;
use crate::reader::read_extract;

/// An extract file that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Every readable extract of a folder.
#[derive(Debug, Clone, Default)]
pub struct ExtractBatch {
    /// Extracts ordered by (period, source).
    pub extracts: Vec<RawExtract>,
    /// Extract files that failed to read.
    pub skipped: Vec<SkippedFile>,
    /// CSV files that are not extracts.
    pub ignored: Vec<PathBuf>,
}

impl ExtractBatch {
    pub fn count(&self, source: SourceKind) -> usize {
        self.extracts.iter().filter(|e| e.source() == source).count()
    }
}

/// Discovers and reads all extracts in `dir`.
///
/// A file that fails to read is logged and recorded in
/// [`ExtractBatch::skipped`]; only folder-level failures are errors.
pub fn load_extracts(dir: &Path, files: &FileConfig) -> Result<ExtractBatch> {
    let discovered = discover_extracts(dir, files)?;
    let mut batch = ExtractBatch {
        ignored: discovered.ignored,
        ..ExtractBatch::default()
    };

    for file in &discovered.files {
        match read_extract(file) {
            Ok(extract) => batch.extracts.push(extract),
            Err(err) => {
                tracing::warn!(
                    path = %file.path.display(),
                    error = %err,
                    "Skipping unreadable extract"
                );
                batch.skipped.push(SkippedFile {
                    path: file.path.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(batch)
}
