//! Recovery of single-month values from year-to-date figures.
//!
//! January's single-month value is its YTD value. Every later month is its
//! YTD minus the YTD of the previous calendar month. When that previous YTD
//! is absent the month is a gap, filled according to [`GapPolicy`].

use panel_model::{
    Accumulation, CanonicalMonth, EntityPanel, FlowDirection, GapPolicy, MonthlySeries,
    TradeMetric,
};

/// A month whose predecessor YTD was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceGap {
    pub entity: String,
    pub metric: TradeMetric,
    pub month: CanonicalMonth,
}

/// Single-month values recovered from one YTD series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesDifference {
    pub current: MonthlySeries,
    /// Months whose previous calendar month had no YTD value.
    pub gaps: Vec<CanonicalMonth>,
}

/// Differences a YTD series with a single forward scan.
pub fn difference_series(ytd: &MonthlySeries, policy: GapPolicy) -> SeriesDifference {
    let mut result = SeriesDifference::default();
    let mut previous: Option<(CanonicalMonth, f64)> = None;

    for (month, value) in ytd.iter() {
        let current = if month.is_january() {
            Some(value)
        } else {
            match previous {
                Some((prev_month, prev_value)) if month.pred() == Some(prev_month) => {
                    Some(value - prev_value)
                }
                _ => {
                    result.gaps.push(month);
                    match policy {
                        GapPolicy::Zero => Some(0.0),
                        GapPolicy::Missing => None,
                    }
                }
            }
        };
        if let Some(current) = current {
            result.current.insert(month, current);
        }
        previous = Some((month, value));
    }

    result
}

/// Outcome of differencing every entity of a panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DifferenceOutcome {
    pub gaps: Vec<DifferenceGap>,
}

/// Fills the current-month metrics of `panel` from its YTD metrics.
///
/// Existing current values are replaced. A month without a YTD value gets no
/// current value. Gaps are logged and returned.
pub fn fill_current_from_ytd(panel: &mut EntityPanel, policy: GapPolicy) -> DifferenceOutcome {
    let mut outcome = DifferenceOutcome::default();
    let entities: Vec<String> = panel.names().map(str::to_string).collect();

    for entity in entities {
        for direction in [
            FlowDirection::Combined,
            FlowDirection::Export,
            FlowDirection::Import,
        ] {
            let ytd_metric = TradeMetric::new(direction, Accumulation::YearToDate);
            let current_metric = ytd_metric.counterpart();
            let ytd = panel.series(&entity, ytd_metric);
            let difference = difference_series(&ytd, policy);

            let months = panel.entity_mut(&entity);
            for (month, bundle) in months.iter_mut() {
                bundle.set(current_metric, difference.current.get(*month));
            }

            for month in difference.gaps {
                tracing::warn!(
                    entity = %entity,
                    metric = %current_metric,
                    month = %month,
                    policy = ?policy,
                    "Previous month YTD missing; single-month value filled by gap policy"
                );
                outcome.gaps.push(DifferenceGap {
                    entity: entity.clone(),
                    metric: current_metric,
                    month,
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::TradeBundle;

    fn m(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::new(year, month).unwrap()
    }

    fn series(values: &[(i32, u32, f64)]) -> MonthlySeries {
        values.iter().map(|&(y, mo, v)| (m(y, mo), v)).collect()
    }

    #[test]
    fn test_ytd_to_monthly() {
        // YTD {Jan:10, Feb:25, Mar:25} -> monthly {10, 15, 0}
        let ytd = series(&[(2024, 1, 10.0), (2024, 2, 25.0), (2024, 3, 25.0)]);
        let diff = difference_series(&ytd, GapPolicy::Zero);
        assert_eq!(diff.current.get(m(2024, 1)), Some(10.0));
        assert_eq!(diff.current.get(m(2024, 2)), Some(15.0));
        assert_eq!(diff.current.get(m(2024, 3)), Some(0.0));
        assert!(diff.gaps.is_empty());
    }

    #[test]
    fn test_january_restarts_across_years() {
        let ytd = series(&[(2023, 12, 500.0), (2024, 1, 40.0), (2024, 2, 90.0)]);
        let diff = difference_series(&ytd, GapPolicy::Zero);
        assert_eq!(diff.current.get(m(2024, 1)), Some(40.0));
        assert_eq!(diff.current.get(m(2024, 2)), Some(50.0));
        // December has no November predecessor.
        assert_eq!(diff.gaps, vec![m(2023, 12)]);
    }

    #[test]
    fn test_gap_policies() {
        let ytd = series(&[(2024, 1, 10.0), (2024, 3, 30.0)]);
        let zero = difference_series(&ytd, GapPolicy::Zero);
        assert_eq!(zero.current.get(m(2024, 3)), Some(0.0));
        assert_eq!(zero.gaps, vec![m(2024, 3)]);

        let missing = difference_series(&ytd, GapPolicy::Missing);
        assert_eq!(missing.current.get(m(2024, 3)), None);
        assert_eq!(missing.gaps, vec![m(2024, 3)]);
    }

    #[test]
    fn test_fill_panel_reports_gaps_per_metric() {
        let mut panel = EntityPanel::new();
        panel.insert(
            "杭州市",
            m(2024, 2),
            TradeBundle::new()
                .with(TradeMetric::COMBINED_YTD, 25.0)
                .with(TradeMetric::EXPORT_YTD, 15.0),
        );
        panel.insert(
            "杭州市",
            m(2024, 1),
            TradeBundle::new().with(TradeMetric::COMBINED_YTD, 10.0),
        );

        let outcome = fill_current_from_ytd(&mut panel, GapPolicy::Missing);
        let feb = panel.get("杭州市", m(2024, 2)).unwrap();
        assert_eq!(feb.get(TradeMetric::COMBINED_CURRENT), Some(15.0));
        assert_eq!(feb.get(TradeMetric::EXPORT_CURRENT), None);
        assert_eq!(
            outcome.gaps,
            vec![DifferenceGap {
                entity: "杭州市".to_string(),
                metric: TradeMetric::EXPORT_CURRENT,
                month: m(2024, 2),
            }]
        );
    }
}
