//! Normalization engine for monthly entity panels.
//!
//! Turns raw national and regional extracts into one canonical entity × month
//! panel, and a wide FX sheet into normalized monthly tables.
//!
//! # Pipeline
//!
//! 1. **Classify** columns (export/import order per extract) and entity rows
//! 2. **Rescale** regional values after the known unit cutover
//! 3. **Collapse** duplicate months, last non-missing value wins
//! 4. **Difference** regional YTD values into single-month values
//! 5. **Reconcile** national and regional entities, regional first
//! 6. **Annotate** every entity with trailing-12-month YoY
//!
//! All month-indexed tables go through the same deduplication primitive in
//! [`dedup`].

pub mod analytics;
pub mod category;
pub mod classify;
pub mod dedup;
pub mod differencer;
pub mod error;
pub mod fx;
pub mod labels;
pub mod pipeline;
pub mod reconcile;
pub mod rescale;

pub use analytics::{
    EntityTable, PanelRow, YOY_LAG_MONTHS, YtdSummary, annotate_entity, running_ytd, ytd_summary,
    ytd_yoy_at, yoy_at,
};
pub use category::{CategoryBreakdown, OtherSource, category_breakdown};
pub use classify::{ClassifiedExtract, ClassifiedRow, Classifier, ColumnLayout};
pub use dedup::{collapse_bundles, collapse_last_non_null, collapse_series, collapse_table};
pub use differencer::{
    DifferenceGap, DifferenceOutcome, SeriesDifference, difference_series, fill_current_from_ytd,
};
pub use error::{CoreError, Result};
pub use fx::{
    FxTables, extract_fx, gross_amount, slice_last_months, slice_series_last_months,
    ytd_sum_and_yoy,
};
pub use labels::{LabelNormalizer, clean_label, find_row, position_of, section_range};
pub use pipeline::{Consolidation, ConsolidationReport, consolidate};
pub use reconcile::{Reconciled, reconcile};
pub use rescale::{REGIONAL_RESCALED_METRICS, REGIONAL_UNIT_CUTOVER, UnitCutover};
