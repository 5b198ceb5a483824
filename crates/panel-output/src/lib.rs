//! Output artifacts of a consolidation run.
//!
//! Converts finalized tables into Polars DataFrames and writes them as CSV,
//! stores the whole panel as a JSON snapshot, and compares a new panel with
//! the previous snapshot. All writes replace their target atomically.

mod error;
mod frame;
mod snapshot;
mod writer;

pub use error::{OutputError, Result};
pub use frame::{MONTH_COLUMN, entity_dataframe, table_dataframe};
pub use snapshot::{PanelDiff, diff_panels, read_snapshot};
pub use writer::{
    FX_COMPONENTS, FX_FORWARD_OUTSTANDING, FX_FORWARD_SIGNED, FX_MAIN, PANEL_SNAPSHOT,
    entity_file_name, write_atomic, write_csv, write_fx_outputs, write_panel_outputs,
    write_snapshot,
};
