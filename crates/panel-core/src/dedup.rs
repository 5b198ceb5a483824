//! Temporal deduplication.
//!
//! Several raw labels can name the same calendar month (a serial day number
//! and a date string, or two serials inside one month). Observations are
//! grouped by canonical month and each column keeps its last non-missing
//! value in original order.

use std::collections::BTreeMap;

use panel_model::{
    CanonicalMonth, EntitySeries, MonthlySeries, MonthlyTable, Numeric, TradeBundle, TradeMetric,
};

/// Collapses keyed rows column by column, keeping the last present value.
///
/// Rows without a key are dropped, as are keys whose collapsed row has no
/// value at all. Every row is padded or truncated to `width` cells.
pub fn collapse_last_non_null<K, I>(rows: I, width: usize) -> BTreeMap<K, Vec<Option<f64>>>
where
    K: Ord,
    I: IntoIterator<Item = (Option<K>, Vec<Option<f64>>)>,
{
    let mut collapsed: BTreeMap<K, Vec<Option<f64>>> = BTreeMap::new();
    for (key, values) in rows {
        let Some(key) = key else {
            continue;
        };
        let slot = collapsed.entry(key).or_insert_with(|| vec![None; width]);
        for (cell, value) in slot.iter_mut().zip(values) {
            if let Some(value) = value.filter(|v| v.is_finite()) {
                *cell = Some(value);
            }
        }
    }
    collapsed.retain(|_, row| row.iter().any(Option::is_some));
    collapsed
}

/// Collapses raw observations into a month-indexed table.
pub fn collapse_table<C, I>(columns: C, rows: I) -> MonthlyTable
where
    C: IntoIterator,
    C::Item: Into<String>,
    I: IntoIterator<Item = (Option<CanonicalMonth>, Vec<Numeric>)>,
{
    let mut table = MonthlyTable::with_columns(columns);
    let width = table.columns().len();
    let rows = rows
        .into_iter()
        .map(|(month, values)| (month, values.into_iter().map(Numeric::value).collect()));
    for (month, values) in collapse_last_non_null(rows, width) {
        table.insert_row(month, values);
    }
    table
}

/// Collapses raw observations of a single quantity into a series.
pub fn collapse_series<I>(observations: I) -> MonthlySeries
where
    I: IntoIterator<Item = (Option<CanonicalMonth>, Numeric)>,
{
    let rows = observations
        .into_iter()
        .map(|(month, value)| (month, vec![value.value()]));
    collapse_last_non_null(rows, 1)
        .into_iter()
        .filter_map(|(month, row)| row[0].map(|v| (month, v)))
        .collect()
}

/// Collapses an entity's bundles, later bundles overriding earlier ones per metric.
pub fn collapse_bundles<I>(bundles: I) -> EntitySeries
where
    I: IntoIterator<Item = (CanonicalMonth, TradeBundle)>,
{
    let rows = bundles
        .into_iter()
        .map(|(month, bundle)| (Some(month), bundle.values().to_vec()));
    collapse_last_non_null(rows, 6)
        .into_iter()
        .map(|(month, values)| {
            let mut bundle = TradeBundle::new();
            for (metric, value) in TradeMetric::ALL.into_iter().zip(values) {
                bundle.set(metric, value);
            }
            (month, bundle)
        })
        .collect()
}
