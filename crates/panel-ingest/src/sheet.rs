//! Wide sheet loading.
//!
//! A wide sheet has a label column, a sub-label column and one column per
//! raw period label. Lines above the header line are titles and are skipped.

use std::path::Path;

use panel_model::{Cell, SheetRow, WideSheet};

use crate::error::{IngestError, Result};
use crate::reader::read_records;

/// Columns preceding the period columns: label and sub-label.
const LABEL_COLUMNS: usize = 2;

/// Reads a CSV export of a wide sheet whose period header is on `header_line`.
pub fn read_wide_sheet(path: &Path, header_line: usize) -> Result<WideSheet> {
    let records = read_records(path)?;
    if records.len() <= header_line {
        return Err(IngestError::TooShort {
            path: path.to_path_buf(),
            found: records.len(),
            required: header_line + 1,
        });
    }

    let mut records = records.into_iter().skip(header_line);
    let header = records.next().unwrap_or_default();
    let period_headers: Vec<Cell> = header
        .iter()
        .skip(LABEL_COLUMNS)
        .map(|field| Cell::from_text(field))
        .collect();

    let rows: Vec<SheetRow> = records
        .filter(|row| row.iter().any(|field| !field.is_empty()))
        .map(|row| sheet_row(&row))
        .collect();

    tracing::debug!(
        path = %path.display(),
        periods = period_headers.len(),
        rows = rows.len(),
        "Read wide sheet"
    );

    Ok(WideSheet::new(period_headers, rows))
}

fn sheet_row(fields: &[String]) -> SheetRow {
    SheetRow {
        label: fields.first().cloned().unwrap_or_default(),
        sublabel: fields.get(1).cloned().unwrap_or_default(),
        values: fields
            .iter()
            .skip(LABEL_COLUMNS)
            .map(|field| Cell::from_text(field))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_wide_sheet_skips_title_lines() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "银行结售汇数据时间序列\n\
             单位：亿元人民币\n\
             ,,,\n\
             项目,,45291,45322\n\
             一、结汇,,\"1,000\",1100\n\
             四、远期结售汇签约额,结汇,10,11\n"
        )
        .unwrap();
        let sheet = read_wide_sheet(file.path(), 3).unwrap();
        assert_eq!(sheet.period_headers.len(), 2);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0].label, "一、结汇");
        assert_eq!(sheet.rows[1].sublabel, "结汇");
        assert_eq!(sheet.rows[0].value(0), &Cell::Text("1,000".to_string()));
    }
}
