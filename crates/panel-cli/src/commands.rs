use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span, warn};

use panel_core::{
    LabelNormalizer, category_breakdown, consolidate, extract_fx, gross_amount, slice_last_months,
    slice_series_last_months, ytd_sum_and_yoy, ytd_summary,
};
use panel_ingest::{load_extracts, read_wide_sheet};
use panel_model::{EngineConfig, FxFlow, SourceKind, TradeMetric};
use panel_output::{
    PANEL_SNAPSHOT, diff_panels, entity_file_name, read_snapshot, write_fx_outputs,
    write_panel_outputs,
};

use crate::cli::{CategoriesArgs, ConsolidateArgs, FxArgs};
use crate::summary::apply_table_style;
use crate::types::{CategoryResult, ConsolidateResult, EntitySummary, FxResult};

/// Loads the engine configuration, falling back to built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("load configuration {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

pub fn run_consolidate(args: &ConsolidateArgs, config: &EngineConfig) -> Result<ConsolidateResult> {
    let raw_dir = &args.raw_dir;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| raw_dir.join("output"));

    // =========================================================================
    // Stage 1: Ingest
    // =========================================================================
    let ingest_span = info_span!("ingest", raw_dir = %raw_dir.display());
    let ingest_start = Instant::now();
    let batch = ingest_span
        .in_scope(|| load_extracts(raw_dir, &config.files))
        .with_context(|| format!("load extracts from {}", raw_dir.display()))?;
    info!(
        national = batch.count(SourceKind::National),
        regional = batch.count(SourceKind::Regional),
        skipped = batch.skipped.len(),
        ignored = batch.ignored.len(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "Ingest complete"
    );

    // =========================================================================
    // Stage 2: Normalize
    // =========================================================================
    let consolidation = consolidate(&batch.extracts, config).context("consolidate extracts")?;

    // =========================================================================
    // Stage 3: Output
    // =========================================================================
    let output_span = info_span!("output", output_dir = %output_dir.display());
    let _output_guard = output_span.enter();

    let snapshot_path = output_dir.join(PANEL_SNAPSHOT);
    let previous = match read_snapshot(&snapshot_path) {
        Ok(previous) => previous,
        Err(error) => {
            warn!(%error, "Previous snapshot unreadable; treating every observation as new");
            None
        }
    };
    let diff = diff_panels(previous.as_ref(), &consolidation.panel);
    info!(
        new_entities = diff.new_entities.len(),
        new_observations = diff.new_observations.len(),
        "Compared with previous panel"
    );

    let written = if args.dry_run {
        info!("Dry run; no files written");
        Vec::new()
    } else {
        write_panel_outputs(&consolidation, &output_dir)
            .with_context(|| format!("write outputs to {}", output_dir.display()))?
    };

    let entities = consolidation
        .tables
        .iter()
        .map(|table| EntitySummary {
            name: table.name.clone(),
            months: table.len(),
            first: table.rows.first().map(|row| row.month),
            last: table.last_month(),
            ytd: ytd_summary(&table.series(TradeMetric::COMBINED_CURRENT)),
            output: (!args.dry_run).then(|| output_dir.join(entity_file_name(&table.name))),
        })
        .collect();

    Ok(ConsolidateResult {
        raw_dir: raw_dir.clone(),
        output_dir: (!args.dry_run).then_some(output_dir),
        entities,
        report: consolidation.report,
        diff,
        skipped: batch.skipped,
        ignored: batch.ignored,
        written,
    })
}

pub fn run_fx(args: &FxArgs, config: &EngineConfig) -> Result<FxResult> {
    let sheet = info_span!("ingest", sheet = %args.sheet.display())
        .in_scope(|| read_wide_sheet(&args.sheet, config.fx.header_line))
        .with_context(|| format!("read FX sheet {}", args.sheet.display()))?;

    let mut tables = extract_fx(&sheet, &config.fx)
        .with_context(|| format!("normalize FX sheet {}", args.sheet.display()))?;

    // Summaries cover the full history; the month limit applies to tables only.
    let summaries = FxFlow::ALL
        .into_iter()
        .filter_map(|flow| {
            let series = tables.main.column(flow.as_str())?;
            ytd_sum_and_yoy(&series).map(|summary| (flow, summary))
        })
        .collect();
    let mut gross = gross_amount(&tables.main);

    if let Some(months) = args.months {
        tables.main = slice_last_months(&tables.main, months);
        tables.components = slice_last_months(&tables.components, months);
        tables.forward_signed = slice_last_months(&tables.forward_signed, months);
        tables.forward_outstanding = slice_last_months(&tables.forward_outstanding, months);
        gross = slice_series_last_months(&gross, months);
    }

    let written = match &args.output_dir {
        Some(dir) => info_span!("output", output_dir = %dir.display())
            .in_scope(|| write_fx_outputs(&tables, dir))
            .with_context(|| format!("write FX outputs to {}", dir.display()))?,
        None => Vec::new(),
    };

    Ok(FxResult {
        sheet: args.sheet.clone(),
        tables,
        summaries,
        gross,
        written,
    })
}

pub fn run_categories(args: &CategoriesArgs, config: &EngineConfig) -> Result<CategoryResult> {
    let sheet = read_wide_sheet(&args.sheet, args.header_line)
        .with_context(|| format!("read category sheet {}", args.sheet.display()))?;
    let normalizer = LabelNormalizer::from_config(&config.labels);
    let breakdown = category_breakdown(
        &sheet,
        &args.section,
        args.end.as_deref(),
        &config.labels,
        &normalizer,
    )
    .with_context(|| format!("break down section {}", args.section))?;
    if breakdown.is_none() {
        warn!(section = %args.section, "Section not found in sheet");
    }
    Ok(CategoryResult {
        section: args.section.clone(),
        breakdown,
    })
}

pub fn run_entities(config: &EngineConfig) {
    let normalizer = LabelNormalizer::from_config(&config.labels);
    let regional: Vec<String> = config
        .locations
        .regional
        .iter()
        .map(|name| normalizer.normalize(name))
        .collect();

    let mut table = Table::new();
    table.set_header(vec!["#", "Entity", "Source"]);
    apply_table_style(&mut table);
    for (index, entity) in config
        .entity_order(|name| normalizer.normalize(name))
        .into_iter()
        .enumerate()
    {
        let source = if entity == config.locations.aggregate {
            "aggregate"
        } else if regional.contains(&entity) {
            "regional"
        } else {
            "national"
        };
        table.add_row(vec![(index + 1).to_string(), entity, source.to_string()]);
    }
    println!("{table}");
}

pub fn run_show_config(config: &EngineConfig) -> Result<()> {
    let text = config.to_toml_string().context("serialize configuration")?;
    print!("{text}");
    Ok(())
}
