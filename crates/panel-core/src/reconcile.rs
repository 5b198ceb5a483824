//! Entity reconciliation between a broad and a narrow panel.
//!
//! The narrow panel has priority: any entity it reports is taken from it
//! alone. Same-named entities of the broad panel are dropped before merging,
//! never averaged or overlaid.

use panel_model::{EntityPanel, LocationConfig};

use crate::error::{CoreError, Result};

/// Merged panel plus the broad entities that were superseded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciled {
    pub panel: EntityPanel,
    /// Broad entities dropped because the narrow panel reports them.
    pub replaced: Vec<String>,
    /// Whether the broad aggregate row was found and renamed.
    pub aggregate_renamed: bool,
}

/// Merges `narrow` into `broad`, giving `narrow` priority per entity.
///
/// The broad panel's aggregate entity (`aggregate_source`) is renamed to the
/// canonical aggregate identifier. Fails when both panels end up empty.
pub fn reconcile(
    mut broad: EntityPanel,
    narrow: EntityPanel,
    locations: &LocationConfig,
) -> Result<Reconciled> {
    let aggregate_renamed = broad.rename(&locations.aggregate_source, &locations.aggregate);

    let mut replaced = Vec::new();
    for entity in narrow.names() {
        if broad.remove(entity).is_some() {
            replaced.push(entity.to_string());
        }
    }

    if broad.is_empty() && narrow.is_empty() {
        return Err(CoreError::NothingToMerge);
    }

    if !replaced.is_empty() {
        tracing::info!(
            count = replaced.len(),
            entities = ?replaced,
            "Narrow source supersedes broad entities"
        );
    }

    broad.absorb(narrow);
    Ok(Reconciled {
        panel: broad,
        replaced,
        aggregate_renamed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::{CanonicalMonth, TradeBundle, TradeMetric};

    fn month() -> CanonicalMonth {
        CanonicalMonth::new(2024, 3).unwrap()
    }

    fn panel(entries: &[(&str, f64)]) -> EntityPanel {
        let mut panel = EntityPanel::new();
        for (name, value) in entries {
            panel.insert(
                name,
                month(),
                TradeBundle::new().with(TradeMetric::COMBINED_CURRENT, *value),
            );
        }
        panel
    }

    fn value(panel: &EntityPanel, entity: &str) -> Option<f64> {
        panel.value(entity, month(), TradeMetric::COMBINED_CURRENT)
    }

    #[test]
    fn test_narrow_entities_take_priority() {
        let locations = LocationConfig {
            aggregate_source: "Total".to_string(),
            aggregate: "Aggregate".to_string(),
            ..LocationConfig::default()
        };
        let broad = panel(&[("Total", 100.0), ("CityA", 30.0), ("CityB", 20.0)]);
        let narrow = panel(&[("CityA", 32.0)]);

        let reconciled = reconcile(broad, narrow, &locations).unwrap();
        let merged = &reconciled.panel;
        assert_eq!(merged.len(), 3);
        assert_eq!(value(merged, "Aggregate"), Some(100.0));
        assert_eq!(value(merged, "CityA"), Some(32.0));
        assert_eq!(value(merged, "CityB"), Some(20.0));
        assert!(!merged.contains("Total"));
        assert_eq!(reconciled.replaced, vec!["CityA".to_string()]);
        assert!(reconciled.aggregate_renamed);
    }

    #[test]
    fn test_narrow_month_gaps_do_not_fall_back() {
        let mut broad = panel(&[("CityA", 30.0)]);
        broad.insert(
            "CityA",
            CanonicalMonth::new(2024, 4).unwrap(),
            TradeBundle::new().with(TradeMetric::COMBINED_CURRENT, 31.0),
        );
        let narrow = panel(&[("CityA", 32.0)]);
        let reconciled = reconcile(broad, narrow, &LocationConfig::default()).unwrap();
        let series = reconciled.panel.entity("CityA").unwrap();
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_nothing_to_merge_is_error() {
        let err = reconcile(
            EntityPanel::new(),
            EntityPanel::new(),
            &LocationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::NothingToMerge));
    }
}
