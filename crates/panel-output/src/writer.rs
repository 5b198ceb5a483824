//! Atomic artifact writers.
//!
//! Every artifact is written to a temporary sibling file, synced and renamed
//! over the target, so a concurrent reader sees either the old or the new file.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use panel_core::{Consolidation, FxTables};
use panel_model::{EntityPanel, MonthlyTable};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};

use crate::error::{OutputError, Result};
use crate::frame::{entity_dataframe, table_dataframe};

/// File name of the panel snapshot.
pub const PANEL_SNAPSHOT: &str = "panel.json";

pub const FX_MAIN: &str = "fx_main.csv";
pub const FX_COMPONENTS: &str = "fx_components.csv";
pub const FX_FORWARD_SIGNED: &str = "fx_forward_signed.csv";
pub const FX_FORWARD_OUTSTANDING: &str = "fx_forward_outstanding.csv";

/// Writes `path` through a temporary file and an atomic rename.
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path).map_err(|e| OutputError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    let mut writer = BufWriter::new(file);
    if let Err(err) = write(&mut writer) {
        drop(writer);
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    writer.flush().map_err(|e| OutputError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    let file = writer.into_inner().map_err(|e| OutputError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e.into_error(),
    })?;
    file.sync_all().map_err(|e| OutputError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| OutputError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), "Wrote artifact");
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsStr::to_os_string).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes a DataFrame as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    write_atomic(path, |writer| {
        CsvWriter::new(writer).include_header(true).finish(df)?;
        Ok(())
    })
}

/// Writes the panel snapshot as pretty JSON.
pub fn write_snapshot(panel: &EntityPanel, path: &Path) -> Result<()> {
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(&mut *writer, panel).map_err(|e| OutputError::Snapshot {
            path: path.to_path_buf(),
            source: e,
        })
    })
}

/// File name of an entity table; path separators are replaced.
pub fn entity_file_name(entity: &str) -> String {
    let safe: String = entity
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect();
    format!("{safe}.csv")
}

/// Writes one CSV per entity plus the panel snapshot into `dir`.
pub fn write_panel_outputs(consolidation: &Consolidation, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(consolidation.tables.len() + 1);
    for table in &consolidation.tables {
        let path = dir.join(entity_file_name(&table.name));
        let mut df = entity_dataframe(table)?;
        write_csv(&mut df, &path)?;
        written.push(path);
    }

    let snapshot = dir.join(PANEL_SNAPSHOT);
    write_snapshot(&consolidation.panel, &snapshot)?;
    written.push(snapshot);

    tracing::info!(
        dir = %dir.display(),
        files = written.len(),
        "Wrote panel outputs"
    );
    Ok(written)
}

/// Writes the four FX tables into `dir`.
pub fn write_fx_outputs(tables: &FxTables, dir: &Path) -> Result<Vec<PathBuf>> {
    let outputs: [(&str, &MonthlyTable); 4] = [
        (FX_MAIN, &tables.main),
        (FX_COMPONENTS, &tables.components),
        (FX_FORWARD_SIGNED, &tables.forward_signed),
        (FX_FORWARD_OUTSTANDING, &tables.forward_outstanding),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (name, table) in outputs {
        let path = dir.join(name);
        let mut df = table_dataframe(table)?;
        write_csv(&mut df, &path)?;
        written.push(path);
    }

    tracing::info!(dir = %dir.display(), files = written.len(), "Wrote FX outputs");
    Ok(written)
}
