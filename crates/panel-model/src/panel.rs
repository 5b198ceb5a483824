//! Entity panels and month-keyed series.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

use crate::metric::{TradeBundle, TradeMetric};
use crate::month::CanonicalMonth;

/// Months of one entity.
pub type EntitySeries = BTreeMap<CanonicalMonth, TradeBundle>;

/// Entity × month panel of customs metrics.
///
/// Entity identity is the normalized display name. Each (entity, month)
/// holds at most one [`TradeBundle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPanel {
    entities: BTreeMap<String, EntitySeries>,
}

impl EntityPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn entity(&self, entity: &str) -> Option<&EntitySeries> {
        self.entities.get(entity)
    }

    pub fn entity_mut(&mut self, entity: &str) -> &mut EntitySeries {
        self.entities.entry(entity.to_string()).or_default()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, EntitySeries> {
        self.entities.iter()
    }

    /// Replaces the bundle for (entity, month).
    pub fn insert(&mut self, entity: &str, month: CanonicalMonth, bundle: TradeBundle) {
        self.entity_mut(entity).insert(month, bundle);
    }

    pub fn get(&self, entity: &str, month: CanonicalMonth) -> Option<&TradeBundle> {
        self.entities.get(entity).and_then(|s| s.get(&month))
    }

    pub fn value(&self, entity: &str, month: CanonicalMonth, metric: TradeMetric) -> Option<f64> {
        self.get(entity, month).and_then(|b| b.get(metric))
    }

    pub fn remove(&mut self, entity: &str) -> Option<EntitySeries> {
        self.entities.remove(entity)
    }

    /// Renames an entity; returns false when `from` is absent.
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.entities.remove(from) {
            Some(series) => {
                self.entities.insert(to.to_string(), series);
                true
            }
            None => false,
        }
    }

    /// Moves every entity of `other` into `self`, replacing same-named entities.
    pub fn absorb(&mut self, other: EntityPanel) {
        self.entities.extend(other.entities);
    }

    /// Number of (entity, month) observations.
    pub fn observation_count(&self) -> usize {
        self.entities.values().map(BTreeMap::len).sum()
    }

    /// Month-ordered series of one metric for one entity.
    pub fn series(&self, entity: &str, metric: TradeMetric) -> MonthlySeries {
        self.entities
            .get(entity)
            .map(|months| {
                months
                    .iter()
                    .filter_map(|(month, bundle)| bundle.get(metric).map(|v| (*month, v)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl FromIterator<(String, EntitySeries)> for EntityPanel {
    fn from_iter<T: IntoIterator<Item = (String, EntitySeries)>>(iter: T) -> Self {
        Self {
            entities: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for EntityPanel {
    type Item = (String, EntitySeries);
    type IntoIter = btree_map::IntoIter<String, EntitySeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.into_iter()
    }
}

/// A month-ordered series of present values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries(BTreeMap<CanonicalMonth, f64>);

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value; non-finite values are not stored.
    pub fn insert(&mut self, month: CanonicalMonth, value: f64) {
        if value.is_finite() {
            self.0.insert(month, value);
        }
    }

    pub fn get(&self, month: CanonicalMonth) -> Option<f64> {
        self.0.get(&month).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_month(&self) -> Option<CanonicalMonth> {
        self.0.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (CanonicalMonth, f64)> + '_ {
        self.0.iter().map(|(m, v)| (*m, *v))
    }

    pub fn months(&self) -> impl Iterator<Item = CanonicalMonth> + '_ {
        self.0.keys().copied()
    }

    /// Values within `[from, to]`, both inclusive.
    pub fn range(
        &self,
        from: CanonicalMonth,
        to: CanonicalMonth,
    ) -> impl Iterator<Item = (CanonicalMonth, f64)> + '_ {
        self.0.range(from..=to).map(|(m, v)| (*m, *v))
    }
}

impl FromIterator<(CanonicalMonth, f64)> for MonthlySeries {
    fn from_iter<T: IntoIterator<Item = (CanonicalMonth, f64)>>(iter: T) -> Self {
        let mut series = Self::new();
        for (month, value) in iter {
            series.insert(month, value);
        }
        series
    }
}

/// A month-indexed table with named columns and optional cells.
///
/// Used for FX tables where columns are sheet rows and time runs down.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTable {
    columns: Vec<String>,
    rows: BTreeMap<CanonicalMonth, Vec<Option<f64>>>,
}

impl MonthlyTable {
    /// Empty table with a fixed schema.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: BTreeMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn months(&self) -> impl DoubleEndedIterator<Item = CanonicalMonth> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (CanonicalMonth, &[Option<f64>])> + '_ {
        self.rows.iter().map(|(m, r)| (*m, r.as_slice()))
    }

    pub fn row(&self, month: CanonicalMonth) -> Option<&[Option<f64>]> {
        self.rows.get(&month).map(Vec::as_slice)
    }

    /// Sets one row; shorter rows are padded with missing cells.
    pub fn insert_row(&mut self, month: CanonicalMonth, mut values: Vec<Option<f64>>) {
        values.resize(self.columns.len(), None);
        for value in &mut values {
            if value.is_some_and(|v| !v.is_finite()) {
                *value = None;
            }
        }
        self.rows.insert(month, values);
    }

    pub fn get(&self, month: CanonicalMonth, column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows.get(&month).and_then(|r| r[index])
    }

    /// One column as a series of present values.
    pub fn column(&self, name: &str) -> Option<MonthlySeries> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .filter_map(|(m, r)| r[index].map(|v| (*m, v)))
                .collect(),
        )
    }

    /// Appends a column computed per month from the existing row.
    pub fn add_column<F>(&mut self, name: impl Into<String>, mut compute: F)
    where
        F: FnMut(CanonicalMonth, &[Option<f64>]) -> Option<f64>,
    {
        self.columns.push(name.into());
        for (month, row) in &mut self.rows {
            let value = compute(*month, row).filter(|v| v.is_finite());
            row.push(value);
        }
    }

    /// Appends a column from a series; months absent from the series are missing.
    pub fn add_series(&mut self, name: impl Into<String>, series: &MonthlySeries) {
        self.add_column(name, |month, _| series.get(month));
    }

    /// Keeps only the latest `count` months present in the table.
    pub fn retain_last(&mut self, count: usize) {
        while self.rows.len() > count {
            self.rows.pop_first();
        }
    }
}
