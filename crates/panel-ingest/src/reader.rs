//! CSV record reading and extract assembly.

use std::path::Path;

use csv::ReaderBuilder;

use panel_model::{Cell, RawExtract, SourceKind};

use crate::discovery::ExtractFile;
use crate::error::{IngestError, Result};

/// Line of the header row in a national extract.
///
/// National extracts carry a two-level header; the second level names the
/// columns and is followed by one unit row that is not data.
pub const NATIONAL_HEADER_LINE: usize = 1;
const NATIONAL_SKIPPED_AFTER_HEADER: usize = 1;

/// Line of the header row in a regional extract.
pub const REGIONAL_HEADER_LINE: usize = 0;

/// Reads every record of a CSV file as trimmed strings.
///
/// Rows may have differing lengths. A UTF-8 BOM on the first field is removed.
pub fn read_records(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_field).collect();
        rows.push(row);
    }
    if let Some(first) = rows.first_mut().and_then(|r| r.first_mut())
        && let Some(stripped) = first.strip_prefix('\u{feff}')
    {
        *first = stripped.trim().to_string();
    }
    Ok(rows)
}

fn normalize_field(raw: &str) -> String {
    raw.trim().to_string()
}

/// Reads an extract file using the layout of its source.
pub fn read_extract(file: &ExtractFile) -> Result<RawExtract> {
    let records = read_records(&file.path)?;
    let (header_line, skipped) = match file.source {
        SourceKind::National => (NATIONAL_HEADER_LINE, NATIONAL_SKIPPED_AFTER_HEADER),
        SourceKind::Regional => (REGIONAL_HEADER_LINE, 0),
    };
    if records.len() <= header_line {
        return Err(IngestError::TooShort {
            path: file.path.clone(),
            found: records.len(),
            required: header_line + 1,
        });
    }

    let mut records = records.into_iter().skip(header_line);
    let header = records.next().unwrap_or_default();
    let rows: Vec<Vec<Cell>> = records
        .skip(skipped)
        .map(|row| row.iter().map(|field| Cell::from_text(field)).collect())
        .collect();

    tracing::debug!(
        path = %file.path.display(),
        source = file.source.as_str(),
        period = %file.period,
        columns = header.len(),
        rows = rows.len(),
        "Read extract"
    );

    Ok(RawExtract::new(file.source, file.period, header, rows).with_origin(&file.path))
}
