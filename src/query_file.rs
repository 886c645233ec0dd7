use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ParsePolicy;
use crate::data::QueryRecord;
use crate::errors::AssemblyError;
use crate::records::resolve_query;

/// Read a JSONL query file into raw JSON objects.
///
/// Blank lines are skipped. Under `ParsePolicy::Strict` the first line that is
/// not a JSON object aborts with `AssemblyError::Parse`; under `Lenient` it is
/// logged and skipped.
pub fn read_query_lines(path: &Path, policy: ParsePolicy) -> Result<Vec<Value>, AssemblyError> {
    if !path.is_file() {
        return Err(AssemblyError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => AssemblyError::NotFound {
            path: path.to_path_buf(),
        },
        _ => AssemblyError::Io(err),
    })?;

    let mut reader = BufReader::new(file);
    let mut rows = Vec::new();
    let mut line = String::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        line_no += 1;
        let bytes = match reader.read_line(&mut line) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                return Err(AssemblyError::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: "line is not valid UTF-8".to_string(),
                });
            }
            Err(err) => return Err(AssemblyError::Io(err)),
        };
        if bytes == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let parsed = serde_json::from_str::<Value>(trimmed)
            .map_err(|err| err.to_string())
            .and_then(|value| {
                if value.is_object() {
                    Ok(value)
                } else {
                    Err("expected a JSON object".to_string())
                }
            });
        match (parsed, policy) {
            (Ok(value), _) => rows.push(value),
            (Err(reason), ParsePolicy::Strict) => {
                return Err(AssemblyError::Parse {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason,
                });
            }
            (Err(reason), ParsePolicy::Lenient) => {
                warn!(
                    "[codeswitch:queries] skipping malformed line {} in {}: {}",
                    line_no,
                    path.display(),
                    reason
                );
            }
        }
    }

    debug!(
        "[codeswitch:queries] read {} query rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

/// Read and resolve every query record in a JSONL query file.
///
/// Records without a resolvable id follow the same policy as malformed lines.
pub fn load_queries(path: &Path, policy: ParsePolicy) -> Result<Vec<QueryRecord>, AssemblyError> {
    let rows = read_query_lines(path, policy)?;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        match resolve_query(row) {
            Ok(record) => records.push(record),
            Err(err) if policy == ParsePolicy::Lenient => {
                warn!("[codeswitch:queries] skipping query record: {err}");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(records)
}
