//! Field resolution and coercion for raw JSON records.
//!
//! Queries resolve their id from `id` then `_id`; corpus rows resolve from
//! `_id` then `id`. Downstream datasets rely on each precedence as-is.

use serde_json::{Map, Value};

use crate::constants::DEFAULT_RELEVANCE_SCORE;
use crate::constants::fields::{CORPUS_ID, ID, QUERY_ID, SCORE, TEXT, TITLE, UNDERSCORE_ID};
use crate::data::{CorpusDocument, QrelEntry, QueryRecord};
use crate::errors::AssemblyError;
use crate::types::{DocId, RelevanceScore};

/// Render a scalar as an identifier; `None` for null and blank strings.
fn value_to_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Render a text field; missing and null become empty.
fn value_to_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn as_object<'a>(
    source_kind: &'static str,
    row: &'a Value,
) -> Result<&'a Map<String, Value>, AssemblyError> {
    row.as_object()
        .ok_or_else(|| AssemblyError::MalformedRecord {
            source_kind,
            details: format!("expected a JSON object, found {row}"),
        })
}

fn first_key(row: &Map<String, Value>, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| row.get(*field).and_then(value_to_key))
}

/// Resolve a local query line into a `QueryRecord`.
pub fn resolve_query(row: &Value) -> Result<QueryRecord, AssemblyError> {
    let obj = as_object("query", row)?;
    let id = first_key(obj, &[ID, UNDERSCORE_ID]).ok_or_else(|| AssemblyError::MalformedRecord {
        source_kind: "query",
        details: format!("no '{ID}' or '{UNDERSCORE_ID}' field in {row}"),
    })?;
    Ok(QueryRecord {
        id,
        text: value_to_text(obj.get(TEXT)),
    })
}

/// Resolve a remote corpus row into its id and document.
pub fn resolve_document(row: &Value) -> Result<(DocId, CorpusDocument), AssemblyError> {
    let obj = as_object("corpus", row)?;
    let id = first_key(obj, &[UNDERSCORE_ID, ID]).ok_or_else(|| AssemblyError::MalformedRecord {
        source_kind: "corpus",
        details: format!("no '{UNDERSCORE_ID}' or '{ID}' field in {row}"),
    })?;
    Ok((
        id,
        CorpusDocument {
            title: value_to_text(obj.get(TITLE)),
            text: value_to_text(obj.get(TEXT)),
        },
    ))
}

/// Resolve a remote qrels row into a `QrelEntry`.
pub fn resolve_qrel(row: &Value) -> Result<QrelEntry, AssemblyError> {
    let obj = as_object("qrels", row)?;
    let query_id = first_key(obj, &[QUERY_ID]).ok_or_else(|| AssemblyError::MalformedRecord {
        source_kind: "qrels",
        details: format!("no '{QUERY_ID}' field in {row}"),
    })?;
    let doc_id = first_key(obj, &[CORPUS_ID]).ok_or_else(|| AssemblyError::MalformedRecord {
        source_kind: "qrels",
        details: format!("no '{CORPUS_ID}' field in {row}"),
    })?;
    let score = coerce_score(obj.get(SCORE))?;
    Ok(QrelEntry {
        query_id,
        doc_id,
        score,
    })
}

/// Coerce a raw score to an integer.
///
/// Missing or null scores default to `1`. Floats truncate toward zero, booleans
/// map to `1`/`0`, and strings parse as an integer or a truncated float.
pub fn coerce_score(value: Option<&Value>) -> Result<RelevanceScore, AssemblyError> {
    let malformed = |raw: &Value| AssemblyError::MalformedRecord {
        source_kind: "qrels",
        details: format!("score {raw} is not an integer"),
    };
    match value {
        None | Some(Value::Null) => Ok(DEFAULT_RELEVANCE_SCORE),
        Some(Value::Bool(b)) => Ok(RelevanceScore::from(*b)),
        Some(raw @ Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .ok_or_else(|| malformed(raw)),
        Some(raw @ Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.trunc() as i64)
                })
                .ok_or_else(|| malformed(raw))
        }
        Some(raw) => Err(malformed(raw)),
    }
}
