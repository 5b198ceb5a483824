//! FX settlement sheet: primary flows, account components and forward triads.
//!
//! Every table is built from sheet rows transposed so that time runs down,
//! with period headers canonicalized and collapsed through
//! [`collapse_table`](crate::dedup::collapse_table).

use panel_model::{
    CanonicalMonth, FxConfig, FxFlow, MonthlySeries, MonthlyTable, Numeric, SheetRow, WideSheet,
};

use crate::analytics::{YtdSummary, running_ytd, yoy_at, ytd_summary, ytd_yoy_at};
use crate::dedup::{collapse_series, collapse_table};
use crate::error::{CoreError, Result};
use crate::labels::{clean_label, find_row, position_of, section_range};

/// Component columns, in output order.
pub const SETTLEMENT_CURRENT_ACCOUNT: &str = "settlement_current_account";
pub const SETTLEMENT_CAPITAL_ACCOUNT: &str = "settlement_capital_account";
pub const SALE_CURRENT_ACCOUNT: &str = "sale_current_account";
pub const SALE_CAPITAL_ACCOUNT: &str = "sale_capital_account";

/// Number of rows in a forward-contract triad.
const TRIAD_LEN: usize = 3;

/// Normalized FX tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FxTables {
    /// Settlement, sale and balance, then per flow `_yoy`, `_ytd` and
    /// `_ytd_yoy` columns.
    pub main: MonthlyTable,
    /// Current/capital account rows of the settlement and sale blocks.
    pub components: MonthlyTable,
    pub forward_signed: MonthlyTable,
    pub forward_outstanding: MonthlyTable,
}

/// Extracts all FX tables from a wide sheet.
///
/// Fails when no period header canonicalizes or a primary row is absent.
/// Missing components and triads yield absent columns and empty tables.
pub fn extract_fx(sheet: &WideSheet, config: &FxConfig) -> Result<FxTables> {
    let months = sheet.period_months();
    if months.iter().all(Option::is_none) {
        return Err(CoreError::NoDateAxis {
            source_name: "FX sheet".to_string(),
        });
    }
    let labels: Vec<&str> = sheet.rows.iter().map(|row| row.label.as_str()).collect();

    let main = main_table(sheet, &labels, &months, config)?;
    let components = component_table(sheet, &labels, &months, config);
    let forward_signed = triad_table(sheet, &labels, &months, &config.forward_signed_label, config);
    let forward_outstanding =
        triad_table(sheet, &labels, &months, &config.forward_outstanding_label, config);

    tracing::info!(
        months = main.len(),
        components = components.columns().len(),
        forward_signed = forward_signed.len(),
        forward_outstanding = forward_outstanding.len(),
        "Extracted FX tables"
    );

    Ok(FxTables {
        main,
        components,
        forward_signed,
        forward_outstanding,
    })
}

fn primary_row<'a>(sheet: &'a WideSheet, labels: &[&str], label: &str) -> Result<&'a SheetRow> {
    position_of(labels, label, 0)
        .map(|idx| &sheet.rows[idx])
        .ok_or_else(|| CoreError::MissingPrimarySection {
            label: label.to_string(),
        })
}

fn row_series(row: &SheetRow, months: &[Option<CanonicalMonth>]) -> MonthlySeries {
    collapse_series(
        months
            .iter()
            .enumerate()
            .map(|(col, month)| (*month, Numeric::from_cell(row.value(col)))),
    )
}

fn main_table(
    sheet: &WideSheet,
    labels: &[&str],
    months: &[Option<CanonicalMonth>],
    config: &FxConfig,
) -> Result<MonthlyTable> {
    let settlement = row_series(primary_row(sheet, labels, &config.settlement_label)?, months);
    let sale = row_series(primary_row(sheet, labels, &config.sale_label)?, months);
    // Required even though the balance is recomputed.
    primary_row(sheet, labels, &config.balance_label)?;

    let mut table = MonthlyTable::with_columns([FxFlow::Settlement.as_str(), FxFlow::Sale.as_str()]);
    let mut union: Vec<CanonicalMonth> = settlement.months().chain(sale.months()).collect();
    union.sort();
    union.dedup();
    for month in union {
        table.insert_row(month, vec![settlement.get(month), sale.get(month)]);
    }
    table.add_column(FxFlow::Balance.as_str(), |_, row| Some(row[0]? - row[1]?));

    let flows: Vec<(FxFlow, MonthlySeries)> = FxFlow::ALL
        .into_iter()
        .filter_map(|flow| table.column(flow.as_str()).map(|series| (flow, series)))
        .collect();
    for (flow, series) in &flows {
        table.add_column(format!("{}_yoy", flow.as_str()), |month, _| {
            yoy_at(series, month)
        });
    }
    for (flow, series) in &flows {
        table.add_series(format!("{}_ytd", flow.as_str()), &running_ytd(series));
        table.add_column(format!("{}_ytd_yoy", flow.as_str()), |month, _| {
            ytd_yoy_at(series, month)
        });
    }
    Ok(table)
}

fn component_table(
    sheet: &WideSheet,
    labels: &[&str],
    months: &[Option<CanonicalMonth>],
    config: &FxConfig,
) -> MonthlyTable {
    let settlement_block = section_range(labels, &config.settlement_label, Some(&config.sale_label));
    let sale_block = section_range(labels, &config.sale_label, Some(&config.balance_label));

    let wanted = [
        (SETTLEMENT_CURRENT_ACCOUNT, &settlement_block, &config.current_account_keyword),
        (SETTLEMENT_CAPITAL_ACCOUNT, &settlement_block, &config.capital_account_keyword),
        (SALE_CURRENT_ACCOUNT, &sale_block, &config.current_account_keyword),
        (SALE_CAPITAL_ACCOUNT, &sale_block, &config.capital_account_keyword),
    ];

    let mut found = Vec::new();
    for (column, block, keyword) in wanted {
        let row = block
            .as_ref()
            .and_then(|range| find_row(labels, range.clone(), keyword));
        match row {
            Some(idx) => found.push((column, &sheet.rows[idx])),
            None => tracing::debug!(column, keyword = %keyword, "FX component row not found"),
        }
    }

    let columns: Vec<&str> = found.iter().map(|(column, _)| *column).collect();
    let rows = months.iter().enumerate().map(|(col, month)| {
        let values = found
            .iter()
            .map(|(_, row)| Numeric::from_cell(row.value(col)))
            .collect();
        (*month, values)
    });
    collapse_table(columns, rows)
}

fn triad_table(
    sheet: &WideSheet,
    labels: &[&str],
    months: &[Option<CanonicalMonth>],
    section_label: &str,
    config: &FxConfig,
) -> MonthlyTable {
    let columns = FxFlow::ALL.map(FxFlow::as_str);
    let Some(start) = position_of(labels, section_label, 0) else {
        tracing::debug!(section = %section_label, "FX triad section absent");
        return MonthlyTable::with_columns(columns);
    };

    let end = (start + TRIAD_LEN).min(sheet.rows.len());
    let triad = &sheet.rows[start..end];
    let wanted: Vec<String> = config.triad_rows.iter().map(|r| clean_label(r)).collect();

    let mut bound: [Option<&SheetRow>; TRIAD_LEN] = [None; TRIAD_LEN];
    for (position, row) in triad.iter().enumerate() {
        let sublabel = clean_label(&row.sublabel);
        let slot = wanted
            .iter()
            .position(|w| *w == sublabel)
            .unwrap_or(position);
        if slot < TRIAD_LEN && bound[slot].is_none() {
            bound[slot] = Some(row);
        }
    }

    let rows = months.iter().enumerate().map(|(col, month)| {
        let values = bound
            .iter()
            .map(|row| row.map_or(Numeric::Missing, |row| Numeric::from_cell(row.value(col))))
            .collect();
        (*month, values)
    });
    collapse_table(columns, rows)
}

/// YTD total of the latest year and its YoY for one FX series.
pub fn ytd_sum_and_yoy(series: &MonthlySeries) -> Option<YtdSummary> {
    ytd_summary(series)
}

/// Settlement plus sale per month, where both are present.
pub fn gross_amount(main: &MonthlyTable) -> MonthlySeries {
    let (Some(settlement), Some(sale)) = (
        main.column(FxFlow::Settlement.as_str()),
        main.column(FxFlow::Sale.as_str()),
    ) else {
        return MonthlySeries::new();
    };
    settlement
        .iter()
        .filter_map(|(month, value)| sale.get(month).map(|s| (month, value + s)))
        .collect()
}

/// The latest `count` months of a table.
///
/// Counts months present in the table, not a calendar window: with gaps the
/// result reaches further back than `count` calendar months.
pub fn slice_last_months(table: &MonthlyTable, count: usize) -> MonthlyTable {
    let mut sliced = table.clone();
    sliced.retain_last(count);
    sliced
}

/// The latest `count` months of a series, counted like [`slice_last_months`].
pub fn slice_series_last_months(series: &MonthlySeries, count: usize) -> MonthlySeries {
    let skip = series.len().saturating_sub(count);
    series.iter().skip(skip).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_model::Cell;

    fn m(year: i32, month: u32) -> CanonicalMonth {
        CanonicalMonth::new(year, month).unwrap()
    }

    fn row(label: &str, sublabel: &str, values: &[&str]) -> SheetRow {
        SheetRow {
            label: label.to_string(),
            sublabel: sublabel.to_string(),
            values: values.iter().map(|v| Cell::from_text(v)).collect(),
        }
    }

    fn sheet(rows: Vec<SheetRow>) -> WideSheet {
        WideSheet::new(
            vec![
                Cell::from_text("2023-03"),
                Cell::from_text("2024-02"),
                Cell::from_text("2024-03"),
            ],
            rows,
        )
    }

    fn full_sheet() -> WideSheet {
        sheet(vec![
            row("一、结汇", "", &["100", "150", "120"]),
            row("经常项目", "", &["70", "90", "80"]),
            row("资本与金融项目", "", &["30", "60", "40"]),
            row("二、售汇", "", &["80", "100", "90"]),
            row("经常项目", "", &["50", "60", "55"]),
            row("三、差额", "", &["20", "50", "30"]),
            row("四、远期结售汇签约额", "结汇", &["5", "6", "7"]),
            row("", "售汇", &["3", "4", "5"]),
            row("", "差额", &["2", "2", "2"]),
        ])
    }

    #[test]
    fn test_main_table_recomputes_balance_and_yoy() {
        let tables = extract_fx(&full_sheet(), &FxConfig::default()).unwrap();
        let main = &tables.main;
        assert_eq!(main.len(), 3);
        assert_eq!(main.get(m(2024, 3), "balance"), Some(30.0));
        assert!((main.get(m(2024, 3), "settlement_yoy").unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(main.get(m(2024, 2), "settlement_yoy"), None);
    }

    #[test]
    fn test_main_table_ytd_columns() {
        let tables = extract_fx(&full_sheet(), &FxConfig::default()).unwrap();
        let main = &tables.main;
        assert_eq!(main.columns().len(), 12);
        assert_eq!(main.columns()[6], "settlement_ytd");
        assert_eq!(main.get(m(2023, 3), "settlement_ytd"), Some(100.0));
        assert_eq!(main.get(m(2024, 3), "settlement_ytd"), Some(270.0));
        assert_eq!(main.get(m(2024, 3), "balance_ytd"), Some(80.0));
        assert!((main.get(m(2024, 3), "settlement_ytd_yoy").unwrap() - 1.7).abs() < 1e-12);
        // No 2023 data through February.
        assert_eq!(main.get(m(2024, 2), "settlement_ytd_yoy"), None);
    }

    #[test]
    fn test_components_only_found_rows() {
        let tables = extract_fx(&full_sheet(), &FxConfig::default()).unwrap();
        assert_eq!(
            tables.components.columns(),
            &[
                SETTLEMENT_CURRENT_ACCOUNT.to_string(),
                SETTLEMENT_CAPITAL_ACCOUNT.to_string(),
                SALE_CURRENT_ACCOUNT.to_string(),
            ]
        );
        assert_eq!(tables.components.get(m(2024, 2), SALE_CURRENT_ACCOUNT), Some(60.0));
    }

    #[test]
    fn test_triads_and_absent_section() {
        let tables = extract_fx(&full_sheet(), &FxConfig::default()).unwrap();
        assert_eq!(tables.forward_signed.get(m(2024, 3), "sale"), Some(5.0));
        assert!(tables.forward_outstanding.is_empty());
        assert_eq!(tables.forward_outstanding.columns().len(), 3);
    }

    #[test]
    fn test_missing_primary_row_is_error() {
        let broken = sheet(vec![row("一、结汇", "", &["1", "2", "3"])]);
        let err = extract_fx(&broken, &FxConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingPrimarySection { label } if label == "二、售汇"));
    }

    #[test]
    fn test_no_date_axis_is_error() {
        let mut bad = full_sheet();
        bad.period_headers = vec![Cell::from_text("合计"); 3];
        assert!(matches!(
            extract_fx(&bad, &FxConfig::default()),
            Err(CoreError::NoDateAxis { .. })
        ));
    }

    #[test]
    fn test_statistics_helpers() {
        let tables = extract_fx(&full_sheet(), &FxConfig::default()).unwrap();
        let gross = gross_amount(&tables.main);
        assert_eq!(gross.get(m(2024, 3)), Some(210.0));

        let settlement = tables.main.column("settlement").unwrap();
        let summary = ytd_sum_and_yoy(&settlement).unwrap();
        assert_eq!(summary.total, 270.0);
        assert_eq!(summary.prior_total, Some(100.0));

        assert_eq!(slice_last_months(&tables.main, 2).len(), 2);
        let last = slice_series_last_months(&settlement, 1);
        assert_eq!(last.months().collect::<Vec<_>>(), vec![m(2024, 3)]);
    }
}
