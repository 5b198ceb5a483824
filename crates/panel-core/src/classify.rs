//! Row and column classification of raw extracts.
//!
//! National extracts are positional: entity, then combined current/YTD, then
//! two directional blocks whose export/import order varies between months.
//! Regional extracts are keyed by header name and carry YTD values only.

use std::collections::BTreeSet;

use panel_model::{
    CanonicalMonth, Cell, EngineConfig, Numeric, RawExtract, SourceKind, TradeBundle, TradeMetric,
};

use crate::labels::{LabelNormalizer, clean_label};

/// Header position of the first directional block.
const FIRST_BLOCK_COLUMN: usize = 3;
/// Header position of the second directional block.
const SECOND_BLOCK_COLUMN: usize = 5;
/// Entity column plus six metric columns.
const NATIONAL_WIDTH: usize = 7;

/// Order of the directional blocks in a national extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnLayout {
    /// Export block before import block.
    ExportFirst,
    /// Import block before export block.
    ImportFirst,
}

impl ColumnLayout {
    /// Metrics bound to columns 1..=6 under this layout.
    pub fn bindings(self) -> [TradeMetric; 6] {
        match self {
            ColumnLayout::ExportFirst => [
                TradeMetric::COMBINED_CURRENT,
                TradeMetric::COMBINED_YTD,
                TradeMetric::EXPORT_CURRENT,
                TradeMetric::EXPORT_YTD,
                TradeMetric::IMPORT_CURRENT,
                TradeMetric::IMPORT_YTD,
            ],
            ColumnLayout::ImportFirst => [
                TradeMetric::COMBINED_CURRENT,
                TradeMetric::COMBINED_YTD,
                TradeMetric::IMPORT_CURRENT,
                TradeMetric::IMPORT_YTD,
                TradeMetric::EXPORT_CURRENT,
                TradeMetric::EXPORT_YTD,
            ],
        }
    }
}

/// One classified entity row.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRow {
    pub entity: String,
    pub bundle: TradeBundle,
}

/// Rows of one extract in the fixed seven-field shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedExtract {
    pub source: SourceKind,
    pub period: CanonicalMonth,
    pub layout: Option<ColumnLayout>,
    pub rows: Vec<ClassifiedRow>,
    /// Non-empty metric cells that did not parse as numbers.
    pub coerced: usize,
}

/// Classifies extracts against configured entity lists and header keywords.
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    config: &'a EngineConfig,
    normalizer: &'a LabelNormalizer,
    targets: BTreeSet<String>,
    regional: BTreeSet<String>,
    regional_total: String,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a EngineConfig, normalizer: &'a LabelNormalizer) -> Self {
        let locations = &config.locations;
        Self {
            config,
            normalizer,
            targets: locations.targets.iter().map(|t| clean_label(t)).collect(),
            regional: locations.regional.iter().map(|r| clean_label(r)).collect(),
            regional_total: clean_label(&locations.regional_total),
        }
    }

    pub fn classify(&self, extract: &RawExtract) -> ClassifiedExtract {
        match extract.source() {
            SourceKind::National => self.classify_national(extract),
            SourceKind::Regional => self.classify_regional(extract),
        }
    }

    /// Determines the directional block order from header text.
    pub fn detect_layout(&self, extract: &RawExtract) -> ColumnLayout {
        let columns = &self.config.columns;
        let first = directional_text(extract.header_text(FIRST_BLOCK_COLUMN), &columns.combined_keyword);
        let second = directional_text(extract.header_text(SECOND_BLOCK_COLUMN), &columns.combined_keyword);
        let (export, import) = (columns.export_keyword.as_str(), columns.import_keyword.as_str());

        if first.contains(export) && second.contains(import) {
            ColumnLayout::ExportFirst
        } else if first.contains(import) && second.contains(export) {
            ColumnLayout::ImportFirst
        } else {
            tracing::debug!(
                extract = %extract.describe(),
                first = %first,
                second = %second,
                "Ambiguous directional headers; assuming export before import"
            );
            ColumnLayout::ExportFirst
        }
    }

    fn classify_national(&self, extract: &RawExtract) -> ClassifiedExtract {
        let layout = self.detect_layout(extract);
        let bindings = layout.bindings();
        let mut rows = Vec::new();
        let mut coerced = 0;

        for (idx, row) in extract.rows().iter().enumerate() {
            let entity = self.normalizer.normalize(&extract.cell(idx, 0).as_text());
            if !self.targets.contains(&entity) {
                continue;
            }
            let mut bundle = TradeBundle::new();
            for (offset, metric) in bindings.iter().enumerate() {
                let cell = row.get(offset + 1).unwrap_or(&Cell::Empty);
                bundle.set(*metric, coerce(cell, &mut coerced));
            }
            rows.push(ClassifiedRow { entity, bundle });
        }

        if extract.header().len() < NATIONAL_WIDTH {
            tracing::warn!(
                extract = %extract.describe(),
                columns = extract.header().len(),
                "National extract narrower than expected; missing columns read as empty"
            );
        }
        tracing::debug!(
            extract = %extract.describe(),
            layout = ?layout,
            rows = rows.len(),
            "Classified national extract"
        );

        ClassifiedExtract {
            source: SourceKind::National,
            period: extract.period(),
            layout: Some(layout),
            rows,
            coerced,
        }
    }

    fn classify_regional(&self, extract: &RawExtract) -> ClassifiedExtract {
        let columns = &self.config.columns;
        let mut result = ClassifiedExtract {
            source: SourceKind::Regional,
            period: extract.period(),
            layout: None,
            rows: Vec::new(),
            coerced: 0,
        };

        let Some(entity_column) = extract.column_index(&columns.regional_entity) else {
            tracing::warn!(
                extract = %extract.describe(),
                column = %columns.regional_entity,
                "Regional extract has no entity column; no rows classified"
            );
            return result;
        };
        let bindings = [
            (TradeMetric::COMBINED_YTD, extract.column_index(&columns.regional_combined_ytd)),
            (TradeMetric::EXPORT_YTD, extract.column_index(&columns.regional_export_ytd)),
            (TradeMetric::IMPORT_YTD, extract.column_index(&columns.regional_import_ytd)),
        ];

        for idx in 0..extract.row_count() {
            let raw = clean_label(&extract.cell(idx, entity_column).as_text());
            if raw == self.regional_total || !self.regional.contains(&raw) {
                continue;
            }
            let mut bundle = TradeBundle::new();
            for (metric, column) in bindings {
                if let Some(column) = column {
                    bundle.set(metric, coerce(extract.cell(idx, column), &mut result.coerced));
                }
            }
            result.rows.push(ClassifiedRow {
                entity: self.normalizer.normalize(&raw),
                bundle,
            });
        }

        tracing::debug!(
            extract = %extract.describe(),
            rows = result.rows.len(),
            "Classified regional extract"
        );
        result
    }
}

fn directional_text(header: &str, combined_keyword: &str) -> String {
    let cleaned = clean_label(header);
    if combined_keyword.is_empty() {
        cleaned
    } else {
        cleaned.replace(combined_keyword, "")
    }
}

fn coerce(cell: &Cell, coerced: &mut usize) -> Option<f64> {
    let value = Numeric::from_cell(cell);
    if value.is_missing() && !cell.is_empty() {
        *coerced += 1;
    }
    value.value()
}
