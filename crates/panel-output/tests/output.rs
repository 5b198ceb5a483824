//! Writing a consolidated panel and reading it back.

use std::fs;

use panel_core::consolidate;
use panel_model::{CanonicalMonth, Cell, EngineConfig, RawExtract, SourceKind};
use panel_output::{PANEL_SNAPSHOT, diff_panels, read_snapshot, write_panel_outputs};
use tempfile::tempdir;

fn extract(month: u32, rows: &[&[&str]]) -> RawExtract {
    let header = ["地区", "进出口", "进出口", "出口", "出口", "进口", "进口"];
    RawExtract::new(
        SourceKind::National,
        CanonicalMonth::new(2024, month).unwrap(),
        header.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|v| Cell::from_text(v)).collect())
            .collect(),
    )
}

#[test]
fn test_write_then_diff_against_snapshot() {
    let dir = tempdir().unwrap();
    let config = EngineConfig::default();

    let first = consolidate(
        &[extract(1, &[&["总值", "10", "10", "6", "6", "4", "4"]])],
        &config,
    )
    .unwrap();
    let written = write_panel_outputs(&first, dir.path()).unwrap();
    assert_eq!(written.len(), 2);

    let csv = fs::read_to_string(dir.path().join("全国.csv")).unwrap();
    let header = csv.lines().next().unwrap();
    assert!(header.starts_with("month,combined_current,combined_ytd"));
    assert!(csv.contains("2024-01"));

    let second = consolidate(
        &[
            extract(1, &[&["总值", "10", "10", "6", "6", "4", "4"]]),
            extract(2, &[&["总值", "5", "15", "3", "9", "2", "6"], &["杭州市", "1", "1", "1", "1", "0", "0"]]),
        ],
        &config,
    )
    .unwrap();

    let previous = read_snapshot(&dir.path().join(PANEL_SNAPSHOT))
        .unwrap()
        .unwrap();
    assert_eq!(previous, first.panel);

    let diff = diff_panels(Some(&previous), &second.panel);
    assert_eq!(diff.new_entities, vec!["杭州市".to_string()]);
    assert_eq!(diff.new_observations.len(), 2);
}
