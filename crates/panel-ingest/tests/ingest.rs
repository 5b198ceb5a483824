//! Integration tests for folder loading.

use panel_ingest::{load_extracts, read_wide_sheet};
use panel_model::{CanonicalMonth, Cell, FileConfig, SourceKind};
use tempfile::TempDir;

const NATIONAL: &str = "\
收发货人所在地,进出口,进出口,进口,进口,出口,出口
收发货人所在地,当月,1至当月累计,进口当月,进口累计,出口当月,出口累计
,万元,万元,万元,万元,万元,万元
总值,100,300,40,120,60,180
杭州市,30,90,10,30,20,60
";

const REGIONAL: &str = "\
收发货人所在地,当期进出口,当期进口,当期出口,进出口同比
合计,1000,400,600,0.1
杭州地区,300,100,200,0.2
";

#[test]
fn loads_both_sources_in_period_order() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("2024-02.csv"), NATIONAL).expect("write");
    std::fs::write(dir.path().join("2024-01.csv"), NATIONAL).expect("write");
    std::fs::write(dir.path().join("浙江省-2024-01.csv"), REGIONAL).expect("write");
    std::fs::write(dir.path().join("output.csv"), "a,b\n").expect("write");

    let batch = load_extracts(dir.path(), &FileConfig::default()).expect("load");
    assert_eq!(batch.extracts.len(), 3);
    assert!(batch.skipped.is_empty());
    assert_eq!(batch.ignored.len(), 1);

    let first = &batch.extracts[0];
    assert_eq!(first.source(), SourceKind::National);
    assert_eq!(first.period(), CanonicalMonth::new(2024, 1).expect("month"));
    assert_eq!(first.header_text(2), "1至当月累计");
    assert_eq!(first.row_count(), 2);

    let regional = &batch.extracts[1];
    assert_eq!(regional.source(), SourceKind::Regional);
    assert_eq!(regional.column_index("当期出口"), Some(3));
    assert_eq!(regional.cell(1, 0), &Cell::Text("杭州地区".to_string()));
}

#[test]
fn missing_folder_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("raw");
    assert!(load_extracts(&missing, &FileConfig::default()).is_err());
}

#[test]
fn wide_sheet_period_headers_canonicalize() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("fx.csv");
    std::fs::write(
        &path,
        "title\nunit\nnote\n项目,,45291,2024-01-31,Unnamed\n一、结汇,,1,2,3\n",
    )
    .expect("write");
    let sheet = read_wide_sheet(&path, 3).expect("read sheet");
    let months = sheet.period_months();
    assert_eq!(months[0], Some(CanonicalMonth::new(2023, 12).expect("month")));
    assert_eq!(months[1], Some(CanonicalMonth::new(2024, 1).expect("month")));
    assert_eq!(months[2], None);
}
