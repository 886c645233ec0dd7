use csv::{ReaderBuilder, Trim};
use parquet::file::reader::{FileReader, SerializedFileReader};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::errors::AssemblyError;

/// On-disk encoding of a dataset shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShardFormat {
    /// One JSON object per line (`.jsonl`, `.ndjson`).
    JsonLines,
    /// Tab-separated values with a header row (`.tsv`).
    Tsv,
    /// Apache parquet (`.parquet`).
    Parquet,
}

impl ShardFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "jsonl" | "ndjson" => Some(Self::JsonLines),
            "tsv" => Some(Self::Tsv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Decode every row of a shard file into JSON values, in file order.
pub fn read_shard_rows(dataset: &str, path: &Path) -> Result<Vec<Value>, AssemblyError> {
    let format = ShardFormat::from_path(path).ok_or_else(|| {
        AssemblyError::remote(
            dataset,
            format!("unsupported shard format: {}", path.display()),
        )
    })?;
    let rows = match format {
        ShardFormat::JsonLines => read_json_lines(dataset, path)?,
        ShardFormat::Tsv => read_tsv(dataset, path)?,
        ShardFormat::Parquet => read_parquet(dataset, path)?,
    };
    debug!(
        "[codeswitch:hub] decoded {} rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

fn open_lines(dataset: &str, path: &Path) -> Result<BufReader<File>, AssemblyError> {
    let file = File::open(path).map_err(|err| {
        AssemblyError::remote(
            dataset,
            format!("failed opening shard {}: {err}", path.display()),
        )
    })?;
    Ok(BufReader::new(file))
}

fn read_json_lines(dataset: &str, path: &Path) -> Result<Vec<Value>, AssemblyError> {
    let reader = open_lines(dataset, path)?;
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!("failed reading shard {}: {err}", path.display()),
            )
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = serde_json::from_str::<Value>(trimmed).map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!(
                    "failed decoding JSON row {} of {}: {err}",
                    idx + 1,
                    path.display()
                ),
            )
        })?;
        rows.push(value);
    }
    Ok(rows)
}

fn read_tsv(dataset: &str, path: &Path) -> Result<Vec<Value>, AssemblyError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!("failed opening shard {}: {err}", path.display()),
            )
        })?;
    let columns = reader
        .headers()
        .map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!("failed reading TSV header of {}: {err}", path.display()),
            )
        })?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!("failed decoding TSV row of {}: {err}", path.display()),
            )
        })?;
        let row = columns
            .iter()
            .zip(record.iter())
            .map(|(column, cell)| (column.to_string(), Value::String(cell.to_string())))
            .collect::<Map<String, Value>>();
        rows.push(Value::Object(row));
    }
    Ok(rows)
}

fn read_parquet(dataset: &str, path: &Path) -> Result<Vec<Value>, AssemblyError> {
    let file = File::open(path).map_err(|err| {
        AssemblyError::remote(
            dataset,
            format!("failed opening parquet shard {}: {err}", path.display()),
        )
    })?;
    let reader = SerializedFileReader::new(file).map_err(|err| {
        AssemblyError::remote(
            dataset,
            format!("failed reading parquet shard {}: {err}", path.display()),
        )
    })?;
    let iter = reader.get_row_iter(None).map_err(|err| {
        AssemblyError::remote(
            dataset,
            format!("failed iterating parquet shard {}: {err}", path.display()),
        )
    })?;

    let mut rows = Vec::new();
    for (idx, row) in iter.enumerate() {
        let row = row.map_err(|err| {
            AssemblyError::remote(
                dataset,
                format!(
                    "failed reading parquet row {} in {}: {err}",
                    idx,
                    path.display()
                ),
            )
        })?;
        rows.push(row.to_json_value());
    }
    Ok(rows)
}
