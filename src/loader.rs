//! Loading protocol logs from disk.
//!
//! Logs are JSON arrays of row objects keyed by the source spreadsheet's
//! column names. Each analyst accumulates their own file
//! (`dados_acumulados_<user>.json`); pointing the loader at a directory
//! merges all of them into one team-wide record set.

use crate::analysis::{normalize_duration, normalize_timestamp};
use crate::models::{Columns, ProtocolRecord, RecordSet, Status};
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Prefix of the per-analyst accumulated log files.
pub const ACCUMULATED_PREFIX: &str = "dados_acumulados_";

const PROTOCOL_KEYS: &[&str] = &["Protocolo", "protocol_id"];
const ANALYST_KEYS: &[&str] = &["Usuário", "analyst"];
const STATUS_KEYS: &[&str] = &["Status", "status"];
const DURATION_KEYS: &[&str] = &["Tempo de Análise", "analysis_duration"];
const TIMESTAMP_KEYS: &[&str] = &["Próximo", "next_timestamp"];
const QUEUE_KEYS: &[&str] = &["Carteira", "queue"];

type Row = Map<String, Value>;

/// Layout of a log that has not recorded anything yet: no queue column.
fn base_columns() -> Columns {
    Columns {
        queue: false,
        analysis_duration: true,
    }
}

/// Load a log file, or every accumulated log in a directory.
///
/// A path that does not exist yields an empty record set.
pub fn load_records(path: &Path, timestamp_format: &str) -> Result<RecordSet> {
    if !path.exists() {
        warn!("Input not found: {}", path.display());
        return Ok(RecordSet::new(Vec::new(), base_columns()));
    }

    if path.is_dir() {
        return load_directory(path, timestamp_format);
    }

    let rows = read_rows(path)?;
    let set = rows_to_records(&rows, timestamp_format);
    info!("Loaded {} records from {}", set.len(), path.display());
    Ok(set)
}

/// Accumulated log files in a directory, sorted by name.
pub fn accumulated_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(ACCUMULATED_PREFIX) && n.ends_with(".json"))
        })
        .collect();

    files.sort();
    Ok(files)
}

fn load_directory(dir: &Path, timestamp_format: &str) -> Result<RecordSet> {
    let files = accumulated_files(dir)?;
    if files.is_empty() {
        warn!("No {}*.json files in {}", ACCUMULATED_PREFIX, dir.display());
        return Ok(RecordSet::new(Vec::new(), base_columns()));
    }

    let mut records = Vec::new();
    let mut columns = Columns {
        queue: false,
        analysis_duration: false,
    };

    for file in &files {
        let rows = read_rows(file)?;
        let set = rows_to_records(&rows, timestamp_format);
        debug!("{}: {} records", file.display(), set.len());

        let file_columns = set.columns();
        columns.queue |= file_columns.queue;
        columns.analysis_duration |= file_columns.analysis_duration;
        records.extend_from_slice(set.records());
    }

    info!(
        "Loaded {} records from {} files in {}",
        records.len(),
        files.len(),
        dir.display()
    );
    Ok(RecordSet::new(records, columns))
}

fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse input file: {}", path.display()))
}

/// Build records from raw rows.
///
/// A column counts as present when any row carries its key; an empty
/// log gets the base layout.
pub fn rows_to_records(rows: &[Row], timestamp_format: &str) -> RecordSet {
    if rows.is_empty() {
        return RecordSet::new(Vec::new(), base_columns());
    }

    let has_key = |keys: &[&str]| rows.iter().any(|row| keys.iter().any(|k| row.contains_key(*k)));
    let columns = Columns {
        queue: has_key(QUEUE_KEYS),
        analysis_duration: has_key(DURATION_KEYS),
    };

    let mut bad_durations = 0usize;
    let mut bad_timestamps = 0usize;

    let records: Vec<ProtocolRecord> = rows
        .iter()
        .map(|row| {
            let raw_duration = cell(row, DURATION_KEYS);
            let analysis_duration = raw_duration.as_deref().and_then(normalize_duration);
            if raw_duration.is_some() && analysis_duration.is_none() {
                bad_durations += 1;
            }

            let raw_timestamp = cell(row, TIMESTAMP_KEYS);
            let next_timestamp = raw_timestamp
                .as_deref()
                .and_then(|raw| normalize_timestamp(raw, timestamp_format));
            if raw_timestamp.is_some() && next_timestamp.is_none() {
                bad_timestamps += 1;
            }

            ProtocolRecord {
                protocol_id: cell(row, PROTOCOL_KEYS),
                analyst: cell(row, ANALYST_KEYS).unwrap_or_default(),
                status: Status::from(cell(row, STATUS_KEYS).unwrap_or_default().as_str()),
                analysis_duration,
                next_timestamp,
                queue: cell(row, QUEUE_KEYS),
            }
        })
        .collect();

    if bad_durations > 0 {
        warn!("{} durations could not be parsed and will be ignored", bad_durations);
    }
    if bad_timestamps > 0 {
        warn!(
            "{} timestamps did not match '{}' and will be ignored",
            bad_timestamps, timestamp_format
        );
    }

    RecordSet::new(records, columns)
}

/// Text of the first matching key; null and empty cells are `None`.
fn cell(row: &Row, keys: &[&str]) -> Option<String> {
    let value = keys.iter().find_map(|k| row.get(*k))?;
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_text(n),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Spreadsheet exports turn integer ids into floats; keep the `.0` so the
/// display layer can strip it like any other artifact.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.1}", f),
        _ => n.to_string(),
    }
}
