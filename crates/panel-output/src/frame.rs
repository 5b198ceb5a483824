//! DataFrame conversion of finalized tables.

use panel_core::EntityTable;
use panel_model::{CanonicalMonth, MonthlyTable, TradeMetric};
use polars::prelude::{Column, DataFrame};

use crate::error::Result;

/// Name of the month column in every output frame.
pub const MONTH_COLUMN: &str = "month";

/// Month-end dates, e.g. `2024-02-29`.
fn month_labels(months: impl Iterator<Item = CanonicalMonth>) -> Vec<String> {
    months.map(|month| month.end_date().to_string()).collect()
}

/// One row per month: `month`, the six metrics, then the six YoY columns.
pub fn entity_dataframe(table: &EntityTable) -> Result<DataFrame> {
    let months = month_labels(table.rows.iter().map(|row| row.month));
    let mut columns = vec![Column::new(MONTH_COLUMN.into(), months)];

    for metric in TradeMetric::ALL {
        let values: Vec<Option<f64>> = table
            .rows
            .iter()
            .map(|row| row.values[metric.index()])
            .collect();
        columns.push(Column::new(metric.column_name().into(), values));
    }
    for metric in TradeMetric::ALL {
        let values: Vec<Option<f64>> =
            table.rows.iter().map(|row| row.yoy[metric.index()]).collect();
        columns.push(Column::new(metric.yoy_column_name().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// One row per month: `month` followed by the table's columns.
pub fn table_dataframe(table: &MonthlyTable) -> Result<DataFrame> {
    let months = month_labels(table.months());
    let mut columns = vec![Column::new(MONTH_COLUMN.into(), months)];

    for (index, name) in table.columns().iter().enumerate() {
        let values: Vec<Option<f64>> = table.rows().map(|(_, row)| row[index]).collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use panel_core::annotate_entity;
    use panel_model::{EntitySeries, TradeBundle};
    use polars::prelude::AnyValue;

    #[test]
    fn test_entity_frame_shape() {
        let mut months = EntitySeries::new();
        months.insert(
            CanonicalMonth::new(2024, 1).unwrap(),
            TradeBundle::new().with(TradeMetric::EXPORT_CURRENT, 3.0),
        );
        let df = entity_dataframe(&annotate_entity("杭州市", &months)).unwrap();
        assert_eq!(df.shape(), (1, 13));
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(names[0], "month");
        assert_eq!(names[3], "export_current");
        assert_eq!(names[12], "import_ytd_yoy");
    }

    #[test]
    fn test_month_column_holds_month_end_dates() {
        let mut table = MonthlyTable::with_columns(["settlement"]);
        table.insert_row(CanonicalMonth::new(2024, 2).unwrap(), vec![Some(1.0)]);
        let df = table_dataframe(&table).unwrap();
        assert_eq!(
            df.column(MONTH_COLUMN).unwrap().get(0).unwrap(),
            AnyValue::String("2024-02-29")
        );
    }

    #[test]
    fn test_table_frame_keeps_schema_when_empty() {
        let table = MonthlyTable::with_columns(["settlement", "sale", "balance"]);
        let df = table_dataframe(&table).unwrap();
        assert_eq!(df.shape(), (0, 4));
    }
}
