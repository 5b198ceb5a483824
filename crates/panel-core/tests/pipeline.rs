//! End-to-end consolidation over in-memory extracts.

use panel_core::{CoreError, consolidate};
use panel_model::{
    CanonicalMonth, Cell, EngineConfig, GapPolicy, RawExtract, SourceKind, TradeMetric,
};

fn m(year: i32, month: u32) -> CanonicalMonth {
    CanonicalMonth::new(year, month).unwrap()
}

fn cells(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::from_text(v)).collect()
}

fn national(period: CanonicalMonth, header: [&str; 7], rows: &[&[&str]]) -> RawExtract {
    RawExtract::new(
        SourceKind::National,
        period,
        header.iter().map(|h| h.to_string()).collect(),
        rows.iter().map(|r| cells(r)).collect(),
    )
}

fn regional(period: CanonicalMonth, rows: &[&[&str]]) -> RawExtract {
    RawExtract::new(
        SourceKind::Regional,
        period,
        vec![
            "收发货人所在地".to_string(),
            "当期进出口".to_string(),
            "当期出口".to_string(),
            "当期进口".to_string(),
        ],
        rows.iter().map(|r| cells(r)).collect(),
    )
}

const EXPORT_FIRST: [&str; 7] = ["地区", "进出口", "进出口", "出口", "出口", "进口", "进口"];
const IMPORT_FIRST: [&str; 7] = ["地区", "进出口", "进出口", "进口", "进口", "出口", "出口"];

fn batch() -> Vec<RawExtract> {
    vec![
        national(
            m(2024, 1),
            EXPORT_FIRST,
            &[
                &["总值", "100", "100", "60", "60", "40", "40"],
                &["杭州市", "9", "9", "5", "5", "4", "4"],
                &["宁波市", "8", "8", "6", "6", "2", "2"],
            ],
        ),
        national(
            m(2024, 2),
            IMPORT_FIRST,
            &[
                &["总值", "110", "210", "50", "90", "60", "120"],
                &["宁波市", "7", "15", "3", "5", "4", "10"],
            ],
        ),
        regional(
            m(2024, 1),
            &[
                &["合计", "999999", "999999", "999999"],
                &["杭州地区", "100000", "60000", "40000"],
            ],
        ),
        regional(m(2024, 2), &[&["杭州地区", "250000", "150000", "100000"]]),
        regional(m(2023, 12), &[&["杭州地区", "12", "7", "5"]]),
    ]
}

#[test]
fn test_full_consolidation() {
    let result = consolidate(&batch(), &EngineConfig::default()).unwrap();
    let panel = &result.panel;

    let names: Vec<_> = result.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["全国", "杭州市", "宁波市"]);

    // Import-first layout in February is bound by header text.
    assert_eq!(
        panel.value("宁波市", m(2024, 2), TradeMetric::EXPORT_YTD),
        Some(10.0)
    );
    assert_eq!(
        panel.value("宁波市", m(2024, 2), TradeMetric::IMPORT_CURRENT),
        Some(3.0)
    );

    // Regional values replace national ones and are rescaled then differenced.
    let hangzhou = panel.entity("杭州市").unwrap();
    assert_eq!(hangzhou.len(), 3);
    let feb = panel.get("杭州市", m(2024, 2)).unwrap();
    assert!((feb.get(TradeMetric::COMBINED_YTD).unwrap() - 25.0).abs() < 1e-9);
    assert!((feb.get(TradeMetric::COMBINED_CURRENT).unwrap() - 15.0).abs() < 1e-9);
    let jan = panel.get("杭州市", m(2024, 1)).unwrap();
    assert!((jan.get(TradeMetric::EXPORT_CURRENT).unwrap() - 6.0).abs() < 1e-9);

    // Before the cutover values keep their unit.
    assert_eq!(
        panel.value("杭州市", m(2023, 12), TradeMetric::COMBINED_YTD),
        Some(12.0)
    );

    assert_eq!(result.report.replaced, vec!["杭州市".to_string()]);
    assert_eq!(result.report.national_extracts, 2);
    assert_eq!(result.report.regional_extracts, 3);
    assert!(!panel.contains("总值"));
    assert!(!panel.contains("合计"));
}

#[test]
fn test_gap_policy_controls_fill() {
    let zero = consolidate(&batch(), &EngineConfig::default()).unwrap();
    assert_eq!(
        zero.panel
            .value("杭州市", m(2023, 12), TradeMetric::COMBINED_CURRENT),
        Some(0.0)
    );
    assert_eq!(zero.report.gaps.len(), 3);

    let config = EngineConfig {
        gap_policy: GapPolicy::Missing,
        ..EngineConfig::default()
    };
    let missing = consolidate(&batch(), &config).unwrap();
    assert_eq!(
        missing
            .panel
            .value("杭州市", m(2023, 12), TradeMetric::COMBINED_CURRENT),
        None
    );
}

#[test]
fn test_unclassifiable_batch_fails_closed() {
    let extracts = vec![regional(m(2024, 1), &[&["合计", "1", "1", "1"]])];
    let err = consolidate(&extracts, &EngineConfig::default()).unwrap_err();
    assert!(matches!(err, CoreError::NothingToMerge));
}
