//! Category breakdown of a bounded sheet block with residual recovery.

use std::collections::BTreeMap;

use panel_model::{CanonicalMonth, LabelConfig, MonthlyTable, Numeric, SheetRow, WideSheet};

use crate::dedup::{collapse_series, collapse_table};
use crate::error::{CoreError, Result};
use crate::labels::{LabelNormalizer, clean_label, section_range};

/// Where the "other" category values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherSource {
    /// The block has its own row for the category.
    Reported,
    /// Total minus the sum of the known categories.
    Residual,
    /// Neither an own row nor a total row; filled with zero.
    Zero,
}

/// Monthly values per canonical category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBreakdown {
    /// One column per configured category, in configured order.
    pub table: MonthlyTable,
    pub other_source: OtherSource,
}

/// Maps the rows of the block `[start, end)` to configured categories.
///
/// Returns `Ok(None)` when the start label is absent.
pub fn category_breakdown(
    sheet: &WideSheet,
    start: &str,
    end: Option<&str>,
    config: &LabelConfig,
    normalizer: &LabelNormalizer,
) -> Result<Option<CategoryBreakdown>> {
    let months = sheet.period_months();
    if months.iter().all(Option::is_none) {
        return Err(CoreError::NoDateAxis {
            source_name: "category sheet".to_string(),
        });
    }
    let labels: Vec<&str> = sheet.rows.iter().map(|row| row.label.as_str()).collect();
    let Some(block) = section_range(&labels, start, end) else {
        tracing::debug!(section = %start, "Category section absent");
        return Ok(None);
    };

    let total_label = clean_label(&config.total_label);
    let mut rows: BTreeMap<usize, &SheetRow> = BTreeMap::new();
    let mut total = None;
    for row in &sheet.rows[block] {
        let canonical = normalizer.normalize(&row.label);
        if canonical == total_label {
            if total.is_none() {
                total = Some(row);
            }
        } else if let Some(index) = config.categories.iter().position(|c| *c == canonical) {
            rows.entry(index).or_insert(row);
        }
    }

    let lookup: Vec<Option<&SheetRow>> = (0..config.categories.len())
        .map(|index| rows.get(&index).copied())
        .collect();
    let observations = months.iter().enumerate().map(|(col, month)| {
        let values = lookup
            .iter()
            .map(|row| row.map_or(Numeric::Missing, |row| Numeric::from_cell(row.value(col))))
            .collect();
        (*month, values)
    });
    let mut table = collapse_table(config.categories.iter().cloned(), observations);

    let other_index = config
        .categories
        .iter()
        .position(|c| *c == config.other_category);
    let other_source = match other_index {
        Some(index) if lookup[index].is_some() => OtherSource::Reported,
        Some(index) => match total {
            Some(total_row) => {
                let totals = collapse_series(
                    months
                        .iter()
                        .enumerate()
                        .map(|(col, month)| (*month, Numeric::from_cell(total_row.value(col)))),
                );
                // Months reported only on the total row still get a residual.
                for month in totals.months() {
                    if table.row(month).is_none() {
                        table.insert_row(month, Vec::new());
                    }
                }
                fill_other(&mut table, index, |month, known| {
                    totals.get(month).map(|total| total - known)
                });
                OtherSource::Residual
            }
            None => {
                fill_other(&mut table, index, |_, _| Some(0.0));
                OtherSource::Zero
            }
        },
        None => OtherSource::Reported,
    };

    tracing::debug!(
        section = %start,
        categories = rows.len(),
        other = ?other_source,
        "Built category breakdown"
    );
    Ok(Some(CategoryBreakdown {
        table,
        other_source,
    }))
}

fn fill_other<F>(table: &mut MonthlyTable, other: usize, compute: F)
where
    F: Fn(CanonicalMonth, f64) -> Option<f64>,
{
    let filled: Vec<(CanonicalMonth, Vec<Option<f64>>)> = table
        .rows()
        .map(|(month, row)| {
            let known: f64 = row
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != other)
                .filter_map(|(_, value)| *value)
                .sum();
            let mut row = row.to_vec();
            row[other] = compute(month, known);
            (month, row)
        })
        .collect();
    for (month, row) in filled {
        table.insert_row(month, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::Cell;

    fn m(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::new(year, month).unwrap()
    }

    fn row(label: &str, values: &[&str]) -> SheetRow {
        SheetRow {
            label: label.to_string(),
            sublabel: String::new(),
            values: values.iter().map(|v| Cell::from_text(v)).collect(),
        }
    }

    fn sheet(rows: Vec<SheetRow>) -> WideSheet {
        WideSheet::new(vec![Cell::from_text("2024-01"), Cell::from_text("2024-02")], rows)
    }

    fn config() -> LabelConfig {
        LabelConfig {
            categories: vec!["农产品".into(), "电子设备".into(), "其他制品".into()],
            ..LabelConfig::default()
        }
    }

    #[test]
    fn test_other_from_total() {
        let sheet = sheet(vec![
            row("出口", &[]),
            row("总值", &["100", "120"]),
            row("农产品", &["30", "40"]),
            row("电子设备", &["50", "50"]),
            row("进口", &[]),
            row("农产品", &["1", "1"]),
        ]);
        let config = config();
        let normalizer = LabelNormalizer::from_config(&config);
        let breakdown = category_breakdown(&sheet, "出口", Some("进口"), &config, &normalizer)
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.other_source, OtherSource::Residual);
        assert_eq!(breakdown.table.get(m(2024, 1), "其他制品"), Some(20.0));
        assert_eq!(breakdown.table.get(m(2024, 2), "农产品"), Some(40.0));
    }

    #[test]
    fn test_other_covers_months_with_only_a_total() {
        let sheet = sheet(vec![
            row("出口", &[]),
            row("总值", &["100", "120"]),
            row("农产品", &["30", ""]),
        ]);
        let config = config();
        let normalizer = LabelNormalizer::from_config(&config);
        let breakdown = category_breakdown(&sheet, "出口", None, &config, &normalizer)
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.table.len(), 2);
        assert_eq!(breakdown.table.get(m(2024, 1), "其他制品"), Some(70.0));
        assert_eq!(breakdown.table.get(m(2024, 2), "其他制品"), Some(120.0));
        assert_eq!(breakdown.table.get(m(2024, 2), "农产品"), None);
    }

    #[test]
    fn test_other_zero_without_total() {
        let sheet = sheet(vec![row("出口", &[]), row("农产品", &["30", "40"])]);
        let config = config();
        let normalizer = LabelNormalizer::from_config(&config);
        let breakdown = category_breakdown(&sheet, "出口", None, &config, &normalizer)
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.other_source, OtherSource::Zero);
        assert_eq!(breakdown.table.get(m(2024, 2), "其他制品"), Some(0.0));
    }

    #[test]
    fn test_reported_other_kept() {
        let sheet = sheet(vec![
            row("出口", &[]),
            row("总值", &["100", "100"]),
            row("其他制品", &["7", "8"]),
        ]);
        let config = config();
        let normalizer = LabelNormalizer::from_config(&config);
        let breakdown = category_breakdown(&sheet, "出口", None, &config, &normalizer)
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.other_source, OtherSource::Reported);
        assert_eq!(breakdown.table.get(m(2024, 1), "其他制品"), Some(7.0));
    }

    #[test]
    fn test_absent_section() {
        let sheet = sheet(vec![row("农产品", &["1", "2"])]);
        let config = config();
        let normalizer = LabelNormalizer::from_config(&config);
        assert!(
            category_breakdown(&sheet, "出口", None, &config, &normalizer)
                .unwrap()
                .is_none()
        );
    }
}
