//! Remote dataset collaborators that supply corpus and qrels rows.
//!
//! A `DatasetHub` turns `(dataset, partition)` into decoded JSON rows. Files
//! belonging to a partition are picked by `select_partition_files`, which both
//! the hub-backed and the local snapshot implementations share.

use serde_json::Value;
use std::path::Path;

use crate::config::{DatasetRef, PartitionRef};
use crate::constants::hub::{DEFAULT_CONFIG, SHARD_EXTENSIONS};
use crate::errors::AssemblyError;
use crate::types::RemoteFile;

/// Shard decoding for JSONL, TSV, and parquet files.
pub mod shards;
/// Local snapshot directory hub.
pub mod snapshot;
/// Hugging Face hub client.
#[cfg(feature = "huggingface")]
pub mod huggingface;

#[cfg(feature = "huggingface")]
pub use huggingface::{HubConfig, HuggingFaceHub};
pub use snapshot::SnapshotHub;

/// Source of remote dataset partitions.
///
/// For a fixed dataset revision, `fetch_rows` must return rows in the same
/// order on every call: files sorted by path, rows in file order.
pub trait DatasetHub: Send + Sync {
    /// Short label used in logs.
    fn id(&self) -> &str;
    /// Fetch every row of `partition` in `dataset`.
    fn fetch_rows(
        &self,
        dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<Value>, AssemblyError>;
}

impl<T: DatasetHub + ?Sized> DatasetHub for Box<T> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn fetch_rows(
        &self,
        dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<Value>, AssemblyError> {
        (**self).fetch_rows(dataset, partition)
    }
}

/// Default accepted shard extensions as owned strings.
pub fn default_shard_extensions() -> Vec<String> {
    SHARD_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}

pub(crate) fn normalized_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|value| value.trim().trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

/// Directory names, file stem, and the stem's prefix before `-`.
fn path_tokens(relative: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut segments = relative.split('/').filter(|segment| !segment.is_empty()).peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            tokens.push(segment);
            continue;
        }
        let stem = segment.split('.').next().unwrap_or(segment);
        tokens.push(stem);
        if let Some((prefix, _)) = stem.split_once('-') {
            tokens.push(prefix);
        }
    }
    tokens
}

fn has_token(tokens: &[&str], name: &str) -> bool {
    tokens.iter().any(|token| token.eq_ignore_ascii_case(name))
}

fn accepted_extension(relative: &str, accepted: &[String]) -> bool {
    Path::new(relative)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| accepted.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Pick the repository files that hold `partition`, sorted by path.
///
/// A file matches when its extension is accepted, one of its path tokens equals
/// the split name, and another equals the config name. Files of the `default`
/// config often sit outside a `default/` directory, so when that strict pass
/// finds nothing for `default`, any split match outside `corpus`/`queries`
/// is accepted.
pub fn select_partition_files(
    files: &[RemoteFile],
    partition: &PartitionRef,
    accepted: &[String],
) -> Vec<RemoteFile> {
    let accepted = normalized_extensions(accepted);
    let eligible = files
        .iter()
        .filter(|file| accepted_extension(file, &accepted))
        .map(|file| (file, path_tokens(file)))
        .filter(|(_, tokens)| has_token(tokens, &partition.split))
        .collect::<Vec<_>>();

    let mut selected = eligible
        .iter()
        .filter(|(_, tokens)| has_token(tokens, &partition.config))
        .map(|(file, _)| (*file).clone())
        .collect::<Vec<_>>();

    if selected.is_empty() && partition.config == DEFAULT_CONFIG {
        selected = eligible
            .iter()
            .filter(|(_, tokens)| !has_token(tokens, "corpus") && !has_token(tokens, "queries"))
            .map(|(file, _)| (*file).clone())
            .collect();
    }

    selected.sort();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<RemoteFile> {
        paths.iter().map(|path| path.to_string()).collect()
    }

    #[test]
    fn beir_layout_maps_corpus_and_default_partitions() {
        let listing = files(&[
            "README.md",
            "corpus.jsonl",
            "queries.jsonl",
            "qrels/test.tsv",
            "qrels/train.tsv",
        ]);
        let accepted = default_shard_extensions();

        assert_eq!(
            select_partition_files(&listing, &PartitionRef::new("corpus", "corpus"), &accepted),
            files(&["corpus.jsonl"])
        );
        assert_eq!(
            select_partition_files(&listing, &PartitionRef::new("default", "test"), &accepted),
            files(&["qrels/test.tsv"])
        );
    }

    #[test]
    fn parquet_layout_requires_config_and_split() {
        let listing = files(&[
            "corpus/dev-00000-of-00002.parquet",
            "corpus/dev-00001-of-00002.parquet",
            "qrels/dev-00000-of-00001.parquet",
            "queries/dev-00000-of-00001.parquet",
        ]);
        let accepted = default_shard_extensions();

        assert_eq!(
            select_partition_files(&listing, &PartitionRef::new("corpus", "dev"), &accepted),
            files(&[
                "corpus/dev-00000-of-00002.parquet",
                "corpus/dev-00001-of-00002.parquet",
            ])
        );
        assert_eq!(
            select_partition_files(&listing, &PartitionRef::new("qrels", "dev"), &accepted),
            files(&["qrels/dev-00000-of-00001.parquet"])
        );
    }

    #[test]
    fn default_config_prefers_explicit_directory() {
        let listing = files(&[
            "default/test-00000-of-00001.parquet",
            "qrels/test.tsv",
            "queries/test-00000-of-00001.parquet",
        ]);
        let selected = select_partition_files(
            &listing,
            &PartitionRef::new("default", "test"),
            &default_shard_extensions(),
        );
        assert_eq!(selected, files(&["default/test-00000-of-00001.parquet"]));
    }

    #[test]
    fn unaccepted_extensions_are_ignored() {
        let listing = files(&["corpus.jsonl.gz", "corpus.parquet"]);
        let selected = select_partition_files(
            &listing,
            &PartitionRef::new("corpus", "corpus"),
            &[".PARQUET".to_string()],
        );
        assert_eq!(selected, files(&["corpus.parquet"]));
    }
}
