//! Panel snapshots and run-to-run differences.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use panel_model::{CanonicalMonth, EntityPanel};

use crate::error::{OutputError, Result};

/// Reads a previously written panel snapshot; `None` if the file does not exist.
pub fn read_snapshot(path: &Path) -> Result<Option<EntityPanel>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(OutputError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source: err,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| OutputError::Snapshot {
            path: path.to_path_buf(),
            source: e,
        })
}

/// What a new panel adds over the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelDiff {
    pub new_entities: Vec<String>,
    /// (entity, month) pairs absent from the previous panel.
    pub new_observations: Vec<(String, CanonicalMonth)>,
}

impl PanelDiff {
    pub fn is_empty(&self) -> bool {
        self.new_entities.is_empty() && self.new_observations.is_empty()
    }

    /// Distinct months among the new observations, ascending.
    pub fn new_months(&self) -> Vec<CanonicalMonth> {
        self.new_observations
            .iter()
            .map(|(_, month)| *month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Compares `current` with `previous`; without a previous panel everything is new.
pub fn diff_panels(previous: Option<&EntityPanel>, current: &EntityPanel) -> PanelDiff {
    let mut diff = PanelDiff::default();
    for (entity, months) in current.iter() {
        let known = previous.and_then(|p| p.entity(entity));
        if known.is_none() {
            diff.new_entities.push(entity.clone());
        }
        for month in months.keys() {
            if !known.is_some_and(|series| series.contains_key(month)) {
                diff.new_observations.push((entity.clone(), *month));
            }
        }
    }
    diff
}
