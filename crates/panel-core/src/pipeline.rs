//! Consolidation pipeline: classify, rescale, collapse, difference, reconcile
//! and annotate a batch of raw extracts.

use std::collections::BTreeMap;

use panel_model::{CanonicalMonth, EngineConfig, EntityPanel, RawExtract, SourceKind, TradeBundle};

use crate::analytics::{EntityTable, annotate_entity};
use crate::classify::Classifier;
use crate::dedup::collapse_bundles;
use crate::differencer::{DifferenceGap, fill_current_from_ytd};
use crate::error::{CoreError, Result};
use crate::labels::LabelNormalizer;
use crate::reconcile::reconcile;
use crate::rescale::{REGIONAL_RESCALED_METRICS, REGIONAL_UNIT_CUTOVER};

/// Counters describing one consolidation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidationReport {
    pub national_extracts: usize,
    pub regional_extracts: usize,
    /// Non-empty cells coerced to missing.
    pub coerced_cells: usize,
    pub gaps: Vec<DifferenceGap>,
    /// National entities superseded by regional ones.
    pub replaced: Vec<String>,
    pub entities: usize,
    pub observations: usize,
}

/// Finalized panel with per-entity tables in output order.
#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub panel: EntityPanel,
    pub tables: Vec<EntityTable>,
    pub report: ConsolidationReport,
}

type Observations = BTreeMap<String, Vec<(CanonicalMonth, TradeBundle)>>;

/// Rebuilds the full entity panel from a batch of extracts.
pub fn consolidate(extracts: &[RawExtract], config: &EngineConfig) -> Result<Consolidation> {
    if extracts.is_empty() {
        return Err(CoreError::NoUsableExtracts);
    }

    let normalizer = LabelNormalizer::from_config(&config.labels);
    let classifier = Classifier::new(config, &normalizer);
    let mut report = ConsolidationReport::default();
    let mut national = Observations::new();
    let mut regional = Observations::new();

    let span = tracing::info_span!("normalize", extracts = extracts.len());
    let _guard = span.enter();

    for extract in extracts {
        let classified = classifier.classify(extract);
        report.coerced_cells += classified.coerced;
        if classified.coerced > 0 {
            tracing::warn!(
                extract = %extract.describe(),
                cells = classified.coerced,
                "Unparseable cells coerced to missing"
            );
        }
        let target = match classified.source {
            SourceKind::National => {
                report.national_extracts += 1;
                &mut national
            }
            SourceKind::Regional => {
                report.regional_extracts += 1;
                &mut regional
            }
        };
        for row in classified.rows {
            let mut bundle = row.bundle;
            if classified.source == SourceKind::Regional {
                REGIONAL_UNIT_CUTOVER.rescale_bundle(
                    classified.period,
                    &mut bundle,
                    &REGIONAL_RESCALED_METRICS,
                );
            }
            target
                .entry(row.entity)
                .or_default()
                .push((classified.period, bundle));
        }
    }

    let broad = assemble(national);
    let mut narrow = assemble(regional);
    let outcome = fill_current_from_ytd(&mut narrow, config.gap_policy);
    report.gaps = outcome.gaps;

    tracing::info!(
        national_entities = broad.len(),
        regional_entities = narrow.len(),
        "Assembled source panels"
    );

    let reconciled = reconcile(broad, narrow, &config.locations)?;
    if !reconciled.aggregate_renamed {
        tracing::warn!(
            label = %config.locations.aggregate_source,
            "Aggregate row not found in national extracts"
        );
    }
    report.replaced = reconciled.replaced;
    let panel = reconciled.panel;

    let tables = ordered_tables(&panel, config, &normalizer);
    report.entities = panel.len();
    report.observations = panel.observation_count();

    tracing::info!(
        entities = report.entities,
        observations = report.observations,
        gaps = report.gaps.len(),
        "Consolidated panel"
    );

    Ok(Consolidation {
        panel,
        tables,
        report,
    })
}

fn assemble(observations: Observations) -> EntityPanel {
    observations
        .into_iter()
        .map(|(entity, rows)| (entity, collapse_bundles(rows)))
        .filter(|(_, series)| !series.is_empty())
        .collect()
}

/// Configured entities first, in configured order, then any others by name.
fn ordered_tables(
    panel: &EntityPanel,
    config: &EngineConfig,
    normalizer: &LabelNormalizer,
) -> Vec<EntityTable> {
    let order = config.entity_order(|name| normalizer.normalize(name));
    let mut tables: Vec<EntityTable> = order
        .iter()
        .filter_map(|name| panel.entity(name).map(|series| annotate_entity(name, series)))
        .collect();
    for (name, series) in panel.iter() {
        if !order.contains(name) {
            tables.push(annotate_entity(name, series));
        }
    }
    tables
}
