//! Extract discovery for raw data folders.
//!
//! Source and reporting period are taken from the file name:
//! `YYYY-MM.csv` is a national extract, `<regional prefix>YYYY-MM.csv` a
//! regional one. Anything else in the folder is ignored.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use panel_model::{CanonicalMonth, FileConfig, SourceKind};

use crate::error::{IngestError, Result};

/// Lists all CSV files in a directory.
///
/// Returns files sorted by filename.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}

/// A CSV file identified as an extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFile {
    pub path: PathBuf,
    pub source: SourceKind,
    pub period: CanonicalMonth,
}

/// National extract names: `YYYY-MM.csv`.
static NATIONAL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{1,2})\.(?i:csv)$").expect("Invalid national file name regex")
});

/// Classifies extract file names.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    regional: Regex,
}

impl FileClassifier {
    pub fn new(files: &FileConfig) -> Result<Self> {
        let pattern = format!(
            r"^{}(\d{{4}})-(\d{{1,2}})\.(?i:csv)$",
            regex::escape(&files.regional_prefix)
        );
        let regional = Regex::new(&pattern)
            .map_err(|source| IngestError::InvalidPattern { pattern, source })?;
        Ok(Self { regional })
    }

    /// Source and period of a file name, `None` when it is not an extract.
    pub fn classify(&self, file_name: &str) -> Option<(SourceKind, CanonicalMonth)> {
        let (source, captures) = if let Some(c) = self.regional.captures(file_name) {
            (SourceKind::Regional, c)
        } else {
            (SourceKind::National, NATIONAL_NAME.captures(file_name)?)
        };
        let year = captures.get(1)?.as_str().parse().ok()?;
        let month = captures.get(2)?.as_str().parse().ok()?;
        let period = CanonicalMonth::new(year, month).ok()?;
        Some((source, period))
    }
}

/// Result of scanning a raw data folder.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredExtracts {
    /// Extract files ordered by (period, source).
    pub files: Vec<ExtractFile>,
    /// CSV files whose names did not identify an extract.
    pub ignored: Vec<PathBuf>,
}

impl DiscoveredExtracts {
    pub fn count(&self, source: SourceKind) -> usize {
        self.files.iter().filter(|f| f.source == source).count()
    }
}

/// Finds national and regional extracts in `dir`.
pub fn discover_extracts(dir: &Path, files: &FileConfig) -> Result<DiscoveredExtracts> {
    let classifier = FileClassifier::new(files)?;
    let mut discovered = DiscoveredExtracts::default();

    for path in list_csv_files(dir)? {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        match classifier.classify(name) {
            Some((source, period)) => discovered.files.push(ExtractFile {
                path,
                source,
                period,
            }),
            None => {
                tracing::debug!(path = %path.display(), "Ignoring non-extract CSV file");
                discovered.ignored.push(path);
            }
        }
    }

    discovered
        .files
        .sort_by(|a, b| (a.period, a.source).cmp(&(b.period, b.source)));

    tracing::info!(
        national = discovered.count(SourceKind::National),
        regional = discovered.count(SourceKind::Regional),
        ignored = discovered.ignored.len(),
        "Discovered extracts"
    );

    Ok(discovered)
}
