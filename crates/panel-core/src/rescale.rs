//! Unit rescaling after a known reporting-unit change.

use panel_model::{CanonicalMonth, TradeBundle, TradeMetric};

/// A fixed unit change: values on or after (`year`, `month`) are multiplied by `factor`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCutover {
    pub year: i32,
    pub month: u32,
    pub factor: f64,
}

/// Regional extracts switch reporting unit from January 2024 on.
pub const REGIONAL_UNIT_CUTOVER: UnitCutover = UnitCutover {
    year: 2024,
    month: 1,
    factor: 1e-4,
};

/// Regional metrics affected by the unit change.
pub const REGIONAL_RESCALED_METRICS: [TradeMetric; 3] = [
    TradeMetric::COMBINED_YTD,
    TradeMetric::EXPORT_YTD,
    TradeMetric::IMPORT_YTD,
];

impl UnitCutover {
    pub fn applies_to(&self, month: CanonicalMonth) -> bool {
        (month.year(), month.month()) >= (self.year, self.month)
    }

    /// Rescales one value observed in `month`.
    pub fn rescale(&self, month: CanonicalMonth, value: f64) -> f64 {
        if self.applies_to(month) {
            value * self.factor
        } else {
            value
        }
    }

    /// Rescales the named metrics of a bundle observed in `month`.
    pub fn rescale_bundle(
        &self,
        month: CanonicalMonth,
        bundle: &mut TradeBundle,
        metrics: &[TradeMetric],
    ) {
        if !self.applies_to(month) {
            return;
        }
        for &metric in metrics {
            if let Some(value) = bundle.get(metric) {
                bundle.set(metric, Some(value * self.factor));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_cutover_boundary() {
        let cutover = REGIONAL_UNIT_CUTOVER;
        assert_eq!(cutover.rescale(m(2023, 12), 50_000.0), 50_000.0);
        assert!((cutover.rescale(m(2024, 1), 50_000.0) - 5.0).abs() < 1e-9);
        assert!(cutover.applies_to(m(2025, 6)));
    }

    #[test]
    fn test_rescale_bundle_only_named_metrics() {
        let mut bundle = TradeBundle::new()
            .with(TradeMetric::COMBINED_YTD, 20_000.0)
            .with(TradeMetric::COMBINED_CURRENT, 7.0);
        REGIONAL_UNIT_CUTOVER.rescale_bundle(m(2024, 3), &mut bundle, &REGIONAL_RESCALED_METRICS);
        assert!((bundle.get(TradeMetric::COMBINED_YTD).unwrap() - 2.0).abs() < 1e-9);
        assert_eq!(bundle.get(TradeMetric::COMBINED_CURRENT), Some(7.0));
    }
}
