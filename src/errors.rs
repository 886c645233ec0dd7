use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::DatasetPath;

/// Error type for query-file loading, remote fetches, and dataset assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Missing or invalid configuration, such as an unset query-file path.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The configured query file does not exist.
    #[error("query file not found: {}", path.display())]
    NotFound {
        /// Path that was checked.
        path: PathBuf,
    },
    /// A query-file line is not valid UTF-8 or not a JSON object.
    #[error("failed parsing {} line {line}: {reason}", path.display())]
    Parse {
        /// Query file being read.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Decoder message.
        reason: String,
    },
    /// A record lacks a required field or has an uncoercible score.
    #[error("malformed {source_kind} record: {details}")]
    MalformedRecord {
        /// `query`, `corpus`, or `qrels`.
        source_kind: &'static str,
        /// What was wrong with the record.
        details: String,
    },
    /// The hub could not list, download, or decode a partition.
    #[error("remote dataset '{dataset}' fetch failed: {reason}")]
    RemoteFetch {
        /// Hub repository id.
        dataset: DatasetPath,
        /// Underlying failure.
        reason: String,
    },
    /// Writing an export directory failed.
    #[error("export failure: {0}")]
    Export(String),
    /// Underlying filesystem error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AssemblyError {
    pub(crate) fn remote(dataset: &str, reason: impl Into<String>) -> Self {
        Self::RemoteFetch {
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }
}
