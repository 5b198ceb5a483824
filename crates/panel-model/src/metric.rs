//! Metric kinds and per-(entity, month) metric bundles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction of a customs flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowDirection {
    Combined,
    Export,
    Import,
}

impl FlowDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowDirection::Combined => "combined",
            FlowDirection::Export => "export",
            FlowDirection::Import => "import",
        }
    }
}

/// Whether a value covers a single month or the year so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accumulation {
    Current,
    YearToDate,
}

impl Accumulation {
    pub fn as_str(self) -> &'static str {
        match self {
            Accumulation::Current => "current",
            Accumulation::YearToDate => "ytd",
        }
    }
}

/// One of the six customs metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TradeMetric {
    pub direction: FlowDirection,
    pub accumulation: Accumulation,
}

impl TradeMetric {
    pub const COMBINED_CURRENT: Self = Self::new(FlowDirection::Combined, Accumulation::Current);
    pub const COMBINED_YTD: Self = Self::new(FlowDirection::Combined, Accumulation::YearToDate);
    pub const EXPORT_CURRENT: Self = Self::new(FlowDirection::Export, Accumulation::Current);
    pub const EXPORT_YTD: Self = Self::new(FlowDirection::Export, Accumulation::YearToDate);
    pub const IMPORT_CURRENT: Self = Self::new(FlowDirection::Import, Accumulation::Current);
    pub const IMPORT_YTD: Self = Self::new(FlowDirection::Import, Accumulation::YearToDate);

    /// All metrics in canonical column order.
    pub const ALL: [Self; 6] = [
        Self::COMBINED_CURRENT,
        Self::COMBINED_YTD,
        Self::EXPORT_CURRENT,
        Self::EXPORT_YTD,
        Self::IMPORT_CURRENT,
        Self::IMPORT_YTD,
    ];

    pub const fn new(direction: FlowDirection, accumulation: Accumulation) -> Self {
        Self {
            direction,
            accumulation,
        }
    }

    /// Position of the metric in [`TradeMetric::ALL`].
    pub fn index(self) -> usize {
        let direction = match self.direction {
            FlowDirection::Combined => 0,
            FlowDirection::Export => 1,
            FlowDirection::Import => 2,
        };
        let accumulation = match self.accumulation {
            Accumulation::Current => 0,
            Accumulation::YearToDate => 1,
        };
        direction * 2 + accumulation
    }

    /// The year-to-date counterpart of a current metric (and vice versa).
    pub fn counterpart(self) -> Self {
        let accumulation = match self.accumulation {
            Accumulation::Current => Accumulation::YearToDate,
            Accumulation::YearToDate => Accumulation::Current,
        };
        Self::new(self.direction, accumulation)
    }

    /// Output column name, e.g. `export_ytd`.
    pub fn column_name(self) -> String {
        format!("{}_{}", self.direction.as_str(), self.accumulation.as_str())
    }

    /// Output column name of the year-over-year change, e.g. `export_ytd_yoy`.
    pub fn yoy_column_name(self) -> String {
        format!("{}_yoy", self.column_name())
    }
}

impl fmt::Display for TradeMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name())
    }
}

/// The six customs metric values for one (entity, month).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeBundle {
    values: [Option<f64>; 6],
}

impl TradeBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: TradeMetric) -> Option<f64> {
        self.values[metric.index()]
    }

    pub fn set(&mut self, metric: TradeMetric, value: Option<f64>) {
        self.values[metric.index()] = value.filter(|v| v.is_finite());
    }

    pub fn with(mut self, metric: TradeMetric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    /// True when no metric carries a value.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Values in canonical metric order.
    pub fn values(&self) -> &[Option<f64>; 6] {
        &self.values
    }
}

/// FX settlement flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FxFlow {
    Settlement,
    Sale,
    Balance,
}

impl FxFlow {
    pub const ALL: [Self; 3] = [FxFlow::Settlement, FxFlow::Sale, FxFlow::Balance];

    pub fn as_str(self) -> &'static str {
        match self {
            FxFlow::Settlement => "settlement",
            FxFlow::Sale => "sale",
            FxFlow::Balance => "balance",
        }
    }
}

impl fmt::Display for FxFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
