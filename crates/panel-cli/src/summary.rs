use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use panel_common::{format_amount, format_ratio};
use panel_core::OtherSource;
use panel_model::{CanonicalMonth, MonthlyTable};

use crate::types::{CategoryResult, ConsolidateResult, FxResult};

/// Rows of FX tables shown on screen.
const FX_PREVIEW_MONTHS: usize = 12;

pub fn print_consolidation_summary(result: &ConsolidateResult) {
    println!("Extracts: {}", result.raw_dir.display());
    match &result.output_dir {
        Some(dir) => println!("Output: {}", dir.display()),
        None => println!("Output: (dry run)"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Months"),
        header_cell("Range"),
        header_cell("YTD"),
        header_cell("YTD YoY"),
        header_cell("Output"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total_months = 0usize;
    for entity in &result.entities {
        total_months += entity.months;
        let ytd = entity.ytd.as_ref();
        table.add_row(vec![
            Cell::new(&entity.name).add_attribute(Attribute::Bold),
            Cell::new(entity.months),
            Cell::new(month_span(entity.first, entity.last)),
            Cell::new(format_amount(ytd.map(|s| s.total), 2)),
            ratio_cell(ytd.and_then(|s| s.yoy)),
            match &entity.output {
                Some(path) => Cell::new(path.display()),
                None => dim_cell("-"),
            },
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_months).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell(format!("{} files", result.written.len())),
    ]);
    println!("{table}");

    let report = &result.report;
    println!(
        "National extracts: {}, regional extracts: {}, coerced cells: {}, differencing gaps: {}",
        report.national_extracts,
        report.regional_extracts,
        report.coerced_cells,
        report.gaps.len()
    );
    if !report.replaced.is_empty() {
        println!("Regional data replaces: {}", report.replaced.join(", "));
    }
    println!("{}", new_data_line(result));

    if !result.skipped.is_empty() {
        eprintln!("Skipped files:");
        for skipped in &result.skipped {
            eprintln!("- {}: {}", skipped.path.display(), skipped.reason);
        }
    }
}

/// One-line description of what this run added.
pub fn new_data_line(result: &ConsolidateResult) -> String {
    let diff = &result.diff;
    if diff.is_empty() {
        return "No new data since the previous run".to_string();
    }
    let months: Vec<String> = diff.new_months().iter().map(ToString::to_string).collect();
    let mut line = format!(
        "New observations: {} across {} month(s)",
        diff.new_observations.len(),
        months.len()
    );
    if months.len() <= 6 {
        line.push_str(&format!(" [{}]", months.join(", ")));
    }
    if !diff.new_entities.is_empty() {
        line.push_str(&format!("; new entities: {}", diff.new_entities.join(", ")));
    }
    line
}

pub fn print_fx_summary(result: &FxResult) {
    println!("Sheet: {}", result.sheet.display());
    println!("{}", render_monthly_table(&result.tables.main, FX_PREVIEW_MONTHS));

    if !result.summaries.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Flow"),
            header_cell("Through"),
            header_cell("YTD"),
            header_cell("Prior YTD"),
            header_cell("YoY"),
        ]);
        apply_table_style(&mut table);
        for (flow, summary) in &result.summaries {
            table.add_row(vec![
                Cell::new(flow.as_str()),
                Cell::new(summary.latest),
                Cell::new(format_amount(Some(summary.total), 2)),
                Cell::new(format_amount(summary.prior_total, 2)),
                ratio_cell(summary.yoy),
            ]);
        }
        println!("{table}");
    }
    if let Some(line) = gross_line(result) {
        println!("{line}");
    }

    for path in &result.written {
        println!("Wrote {}", path.display());
    }
}

/// Latest gross settlement plus sale, with the span it was taken from.
pub fn gross_line(result: &FxResult) -> Option<String> {
    let (month, value) = result.gross.iter().next_back()?;
    let first = result.gross.months().next();
    Some(format!(
        "Gross settlement + sale, {month}: {} (series {})",
        format_amount(Some(value), 2),
        month_span(first, Some(month))
    ))
}

pub fn print_category_summary(result: &CategoryResult) {
    let Some(breakdown) = &result.breakdown else {
        println!("Section '{}' not found", result.section);
        return;
    };
    println!("Section: {}", result.section);
    println!("{}", render_monthly_table(&breakdown.table, usize::MAX));
    println!("Other category: {}", other_source_label(breakdown.other_source));
}

pub fn other_source_label(source: OtherSource) -> &'static str {
    match source {
        OtherSource::Reported => "reported",
        OtherSource::Residual => "total minus known categories",
        OtherSource::Zero => "zero (no total row)",
    }
}

/// The latest `limit` months of a table; ratio columns as percentages.
pub fn render_monthly_table(source: &MonthlyTable, limit: usize) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("Month")];
    header.extend(source.columns().iter().map(|name| header_cell(name)));
    table.set_header(header);
    apply_table_style(&mut table);

    let skip = source.len().saturating_sub(limit);
    for (month, row) in source.rows().skip(skip) {
        let mut cells = vec![Cell::new(month)];
        for (name, value) in source.columns().iter().zip(row) {
            if name.ends_with("_yoy") {
                cells.push(ratio_cell(*value));
            } else {
                cells.push(Cell::new(format_amount(*value, 2)).set_alignment(CellAlignment::Right));
            }
        }
        table.add_row(cells);
    }
    table
}

pub fn month_span(first: Option<CanonicalMonth>, last: Option<CanonicalMonth>) -> String {
    match (first, last) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "-".to_string(),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn ratio_cell(value: Option<f64>) -> Cell {
    let cell = Cell::new(format_ratio(value)).set_alignment(CellAlignment::Right);
    match value {
        Some(v) if v < 0.0 => cell.fg(Color::Red),
        Some(_) => cell.fg(Color::Green),
        None => cell.fg(Color::DarkGrey),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
