//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "panel",
    version,
    about = "Normalize monthly customs extracts and FX settlement sheets into entity panels",
    long_about = "Normalize monthly customs extracts and FX settlement sheets.\n\n\
                  Consolidates national and regional extracts into one entity x month\n\
                  panel with single-month values, YTD values and year-over-year change."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Engine configuration file (TOML); built-in defaults when omitted.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Consolidate a folder of monthly extracts into an entity panel.
    Consolidate(ConsolidateArgs),

    /// Normalize an FX settlement sheet export.
    Fx(FxArgs),

    /// Break a labeled sheet block down into product categories.
    Categories(CategoriesArgs),

    /// List entities in output order.
    Entities,

    /// Print the effective configuration as TOML.
    ShowConfig,
}

#[derive(Parser)]
pub struct ConsolidateArgs {
    /// Folder containing `YYYY-MM.csv` and regional extract files.
    #[arg(value_name = "RAW_DIR")]
    pub raw_dir: PathBuf,

    /// Output directory (default: <RAW_DIR>/output).
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct FxArgs {
    /// CSV export of the FX settlement sheet.
    #[arg(value_name = "SHEET_CSV")]
    pub sheet: PathBuf,

    /// Keep only the latest N months.
    #[arg(long = "months", value_name = "N")]
    pub months: Option<usize>,

    /// Write the FX tables into this directory.
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CategoriesArgs {
    /// CSV export of the category sheet.
    #[arg(value_name = "SHEET_CSV")]
    pub sheet: PathBuf,

    /// Label of the block's first row.
    #[arg(long = "section", value_name = "LABEL")]
    pub section: String,

    /// Label of the row after the block (default: end of sheet).
    #[arg(long = "end", value_name = "LABEL")]
    pub end: Option<String>,

    /// Zero-based line of the period header row.
    #[arg(long = "header-line", value_name = "LINE", default_value_t = 0)]
    pub header_line: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
