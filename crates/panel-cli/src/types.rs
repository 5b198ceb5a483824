use std::path::PathBuf;

use panel_core::{CategoryBreakdown, ConsolidationReport, FxTables, YtdSummary};
use panel_ingest::SkippedFile;
use panel_model::{CanonicalMonth, FxFlow, MonthlySeries};
use panel_output::PanelDiff;

/// Per-entity line of the consolidation summary.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySummary {
    pub name: String,
    pub months: usize,
    pub first: Option<CanonicalMonth>,
    pub last: Option<CanonicalMonth>,
    /// Combined single-month values summed over the latest year.
    pub ytd: Option<YtdSummary>,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ConsolidateResult {
    pub raw_dir: PathBuf,
    /// `None` for dry runs.
    pub output_dir: Option<PathBuf>,
    pub entities: Vec<EntitySummary>,
    pub report: ConsolidationReport,
    pub diff: PanelDiff,
    pub skipped: Vec<SkippedFile>,
    pub ignored: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FxResult {
    pub sheet: PathBuf,
    pub tables: FxTables,
    /// YTD summaries over the whole sheet, before any month limit.
    pub summaries: Vec<(FxFlow, YtdSummary)>,
    /// Settlement plus sale per month, limited like the tables.
    pub gross: MonthlySeries,
    pub written: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct CategoryResult {
    pub section: String,
    /// `None` when the section label is absent from the sheet.
    pub breakdown: Option<CategoryBreakdown>,
}
