//! Derived metrics: trailing-12-month YoY, running YTD and YTD summaries.

use panel_model::{CanonicalMonth, EntitySeries, MonthlySeries, TradeMetric};

/// Months between a value and its YoY reference.
pub const YOY_LAG_MONTHS: i32 = 12;

/// `v[t] / v[t-12] - 1`, undefined when the lagged value is absent or zero.
pub fn yoy_at(series: &MonthlySeries, month: CanonicalMonth) -> Option<f64> {
    let current = series.get(month)?;
    let lagged = series.get(month.offset(-YOY_LAG_MONTHS)?)?;
    ratio(current, lagged)
}

/// Running sum of single-month values, restarting every January.
///
/// The sum restarts with the first observed month of each year.
pub fn running_ytd(current: &MonthlySeries) -> MonthlySeries {
    let mut running = MonthlySeries::new();
    let mut year = None;
    let mut total = 0.0;
    for (month, value) in current.iter() {
        if year != Some(month.year()) {
            year = Some(month.year());
            total = 0.0;
        }
        total += value;
        running.insert(month, total);
    }
    running
}

/// Year-to-date total of the most recent year and its YoY change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YtdSummary {
    /// Latest month with a value; the window is January through this month.
    pub latest: CanonicalMonth,
    pub total: f64,
    /// Same window one year earlier, `None` if that window has no data.
    pub prior_total: Option<f64>,
    pub yoy: Option<f64>,
}

/// Sums January through the latest month of the most recent year and compares
/// with the same window of the previous year.
pub fn ytd_summary(series: &MonthlySeries) -> Option<YtdSummary> {
    let latest = series.last_month()?;
    let total = window_sum(series, latest.year_start(), latest)?;
    let prior_total = latest
        .offset(-YOY_LAG_MONTHS)
        .and_then(|prior_end| window_sum(series, prior_end.year_start(), prior_end));
    let yoy = prior_total.and_then(|prior| ratio(total, prior));
    Some(YtdSummary {
        latest,
        total,
        prior_total,
        yoy,
    })
}

/// YTD through `month` against the same January window one year earlier.
///
/// Undefined when either window has no data or the prior total is zero.
pub fn ytd_yoy_at(series: &MonthlySeries, month: CanonicalMonth) -> Option<f64> {
    let total = window_sum(series, month.year_start(), month)?;
    let prior_end = month.offset(-YOY_LAG_MONTHS)?;
    let prior = window_sum(series, prior_end.year_start(), prior_end)?;
    ratio(total, prior)
}

fn window_sum(series: &MonthlySeries, from: CanonicalMonth, to: CanonicalMonth) -> Option<f64> {
    series
        .range(from, to)
        .map(|(_, value)| value)
        .fold(None, |acc, value| Some(acc.unwrap_or(0.0) + value))
}

fn ratio(value: f64, base: f64) -> Option<f64> {
    if base == 0.0 {
        return None;
    }
    let ratio = value / base - 1.0;
    ratio.is_finite().then_some(ratio)
}

/// One finalized month of an entity: six metrics and their YoY.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRow {
    pub month: CanonicalMonth,
    pub values: [Option<f64>; 6],
    pub yoy: [Option<f64>; 6],
}

/// Finalized rows of one entity in month order.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTable {
    pub name: String,
    pub rows: Vec<PanelRow>,
}

impl EntityTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last_month(&self) -> Option<CanonicalMonth> {
        self.rows.last().map(|row| row.month)
    }

    /// One metric as a series of present values.
    pub fn series(&self, metric: TradeMetric) -> MonthlySeries {
        self.rows
            .iter()
            .filter_map(|row| row.values[metric.index()].map(|v| (row.month, v)))
            .collect()
    }
}

/// Attaches YoY columns to an entity's monthly bundles.
pub fn annotate_entity(name: &str, months: &EntitySeries) -> EntityTable {
    let series: Vec<MonthlySeries> = TradeMetric::ALL
        .iter()
        .map(|metric| {
            months
                .iter()
                .filter_map(|(month, bundle)| bundle.get(*metric).map(|v| (*month, v)))
                .collect()
        })
        .collect();

    let rows = months
        .iter()
        .map(|(month, bundle)| {
            let mut yoy = [None; 6];
            for (slot, values) in yoy.iter_mut().zip(&series) {
                *slot = yoy_at(values, *month);
            }
            PanelRow {
                month: *month,
                values: *bundle.values(),
                yoy,
            }
        })
        .collect();

    EntityTable {
        name: name.to_string(),
        rows,
    }
}
