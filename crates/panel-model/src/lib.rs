//! Data model for monthly entity panels.
//!
//! Raw extracts enter as [`RawExtract`] / [`WideSheet`]; normalized data lives
//! in [`EntityPanel`], [`MonthlySeries`] and [`MonthlyTable`], all keyed by
//! [`CanonicalMonth`].

pub mod config;
pub mod error;
pub mod extract;
pub mod metric;
pub mod month;
pub mod numeric;
pub mod panel;

pub use config::{
    ColumnConfig, EngineConfig, FileConfig, FxConfig, GapPolicy, LabelConfig, LabelRule,
    LocationConfig,
};
pub use error::{ModelError, Result};
pub use extract::{RawExtract, SheetRow, SourceKind, WideSheet};
pub use metric::{Accumulation, FlowDirection, FxFlow, TradeBundle, TradeMetric};
pub use month::CanonicalMonth;
pub use numeric::{Cell, Numeric};
pub use panel::{EntityPanel, EntitySeries, MonthlySeries, MonthlyTable};
