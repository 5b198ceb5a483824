//! Raw extracts and wide sheets as read from disk.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::month::CanonicalMonth;
use crate::numeric::Cell;

static EMPTY_CELL: Cell = Cell::Empty;

/// Which feed an extract came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    National,
    Regional,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::National => "national",
            SourceKind::Regional => "regional",
        }
    }
}

/// One parsed monthly extract.
///
/// The reporting period comes from the extract's file name, never from its
/// contents. Rows may be shorter than the header; missing cells read as
/// [`Cell::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtract {
    source: SourceKind,
    period: CanonicalMonth,
    header: Vec<String>,
    rows: Vec<Vec<Cell>>,
    origin: Option<PathBuf>,
}

impl RawExtract {
    pub fn new(
        source: SourceKind,
        period: CanonicalMonth,
        header: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Self {
        Self {
            source,
            period,
            header,
            rows,
            origin: None,
        }
    }

    pub fn with_origin(mut self, path: impl Into<PathBuf>) -> Self {
        self.origin = Some(path.into());
        self
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn period(&self) -> CanonicalMonth {
        self.period
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Header text of a column, empty when the column does not exist.
    pub fn header_text(&self, column: usize) -> &str {
        self.header.get(column).map_or("", String::as_str)
    }

    /// Index of the first header equal to `name` after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name.trim())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Display name for logs: the origin path or `<source> <period>`.
    pub fn describe(&self) -> String {
        match &self.origin {
            Some(path) => path.display().to_string(),
            None => format!("{} {}", self.source.as_str(), self.period),
        }
    }
}

/// A labeled row of a wide sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetRow {
    /// First column: section or item label.
    pub label: String,
    /// Second column: triad sub-label (`结汇`, `售汇`, `差额`).
    pub sublabel: String,
    /// One cell per period column.
    pub values: Vec<Cell>,
}

impl SheetRow {
    pub fn value(&self, column: usize) -> &Cell {
        self.values.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// A wide spreadsheet: labeled rows and one column per raw period label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideSheet {
    pub period_headers: Vec<Cell>,
    pub rows: Vec<SheetRow>,
}

impl WideSheet {
    pub fn new(period_headers: Vec<Cell>, rows: Vec<SheetRow>) -> Self {
        Self {
            period_headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Period headers canonicalized, `None` where a label does not parse.
    pub fn period_months(&self) -> Vec<Option<CanonicalMonth>> {
        self.period_headers
            .iter()
            .map(CanonicalMonth::from_cell)
            .collect()
    }
}
