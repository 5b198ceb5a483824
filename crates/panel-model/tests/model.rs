//! Tests for panel-model types.

use panel_model::{
    CanonicalMonth, EngineConfig, EntityPanel, MonthlySeries, TradeBundle, TradeMetric,
};

fn m(year: i32, month: u32) -> CanonicalMonth {
    CanonicalMonth::new(year, month).expect("valid month")
}

#[test]
fn panel_serializes_with_month_keys() {
    let mut panel = EntityPanel::new();
    panel.insert(
        "全国",
        m(2024, 1),
        TradeBundle::new().with(TradeMetric::COMBINED_CURRENT, 100.0),
    );
    let json = serde_json::to_string(&panel).expect("serialize panel");
    assert!(json.contains("\"全国\""));
    assert!(json.contains("\"2024-01\""));
    let round: EntityPanel = serde_json::from_str(&json).expect("deserialize panel");
    assert_eq!(round, panel);
}

#[test]
fn series_orders_months_chronologically() {
    let series: MonthlySeries = [(m(2024, 3), 3.0), (m(2023, 12), 1.0), (m(2024, 1), 2.0)]
        .into_iter()
        .collect();
    let months: Vec<_> = series.months().collect();
    assert_eq!(months, vec![m(2023, 12), m(2024, 1), m(2024, 3)]);
    assert_eq!(series.last_month(), Some(m(2024, 3)));
}

#[test]
fn series_drops_non_finite_values() {
    let mut series = MonthlySeries::new();
    series.insert(m(2024, 1), f64::NAN);
    series.insert(m(2024, 2), f64::INFINITY);
    assert!(series.is_empty());
}

#[test]
fn month_labels_of_different_shapes_collapse() {
    let labels = ["2023-12", "2023-12-31", "2023/12/01", "2023年12月", "45291"];
    for label in labels {
        assert_eq!(CanonicalMonth::parse_label(label), Some(m(2023, 12)), "{label}");
    }
}

#[test]
fn config_loads_from_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("engine.toml");
    std::fs::write(&path, "[locations]\naggregate = \"National\"\n").expect("write config");
    let config = EngineConfig::load(&path).expect("load config");
    assert_eq!(config.locations.aggregate, "National");
    assert_eq!(config.locations.aggregate_source, "总值");
}

#[test]
fn config_load_reports_missing_file() {
    let err = EngineConfig::load(std::path::Path::new("/nonexistent/engine.toml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}
