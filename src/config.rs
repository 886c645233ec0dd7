use std::env;
use std::path::PathBuf;

use crate::types::{DatasetPath, Revision, SplitName};

/// How malformed lines and records in the local query file are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Abort assembly on the first malformed line or query record.
    #[default]
    Strict,
    /// Log a warning and skip the offending line or record.
    Lenient,
}

/// Remote dataset identity pinned to a revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetRef {
    /// Hub repository id, e.g. `mteb/scidocs`.
    pub path: DatasetPath,
    /// Commit sha or branch the corpus and qrels are read from.
    pub revision: Revision,
}

impl DatasetRef {
    /// Create a dataset reference.
    pub fn new(path: impl Into<DatasetPath>, revision: impl Into<Revision>) -> Self {
        Self {
            path: path.into(),
            revision: revision.into(),
        }
    }
}

/// One named partition of a remote dataset: a dataset config plus a split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionRef {
    /// Dataset config name, e.g. `corpus`, `default`, `qrels`.
    pub config: String,
    /// Split name inside the config, e.g. `corpus`, `test`, `dev`.
    pub split: SplitName,
}

impl PartitionRef {
    /// Create a partition reference.
    pub fn new(config: impl Into<String>, split: impl Into<SplitName>) -> Self {
        Self {
            config: config.into(),
            split: split.into(),
        }
    }
}

/// Explicit configuration for one dataset assembly.
///
/// The query-file path is resolved before this struct is built; the assembler
/// never reads the environment itself.
#[derive(Clone, Debug)]
pub struct AssemblerConfig {
    /// Local JSONL query file. `None` fails assembly with a configuration error.
    pub query_file: Option<PathBuf>,
    /// Remote dataset providing corpus and qrels.
    pub dataset: DatasetRef,
    /// Partition holding corpus documents.
    pub corpus: PartitionRef,
    /// Partition holding relevance judgments.
    pub qrels: PartitionRef,
    /// Split key under which all three maps are stored.
    pub target_split: SplitName,
    /// Malformed query-line handling.
    pub parse_policy: ParsePolicy,
}

impl AssemblerConfig {
    /// Create a config with `corpus/corpus` and `default/test` partitions and target split `test`.
    pub fn new(dataset: DatasetRef) -> Self {
        Self {
            query_file: None,
            dataset,
            corpus: PartitionRef::new("corpus", "corpus"),
            qrels: PartitionRef::new("default", "test"),
            target_split: "test".to_string(),
            parse_policy: ParsePolicy::Strict,
        }
    }

    /// Set the local query file.
    pub fn with_query_file(mut self, query_file: Option<PathBuf>) -> Self {
        self.query_file = query_file;
        self
    }

    /// Set the corpus partition.
    pub fn with_corpus(mut self, corpus: PartitionRef) -> Self {
        self.corpus = corpus;
        self
    }

    /// Set the qrels partition.
    pub fn with_qrels(mut self, qrels: PartitionRef) -> Self {
        self.qrels = qrels;
        self
    }

    /// Set the split key used for the assembled maps.
    pub fn with_target_split(mut self, split: impl Into<SplitName>) -> Self {
        self.target_split = split.into();
        self
    }

    /// Set the malformed-line policy.
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }
}

/// Resolve the query-file path from an explicit value, falling back to `env_var`.
///
/// Blank values on either side count as unset. Call this at the outermost
/// composition boundary only.
pub fn resolve_query_file(explicit: Option<PathBuf>, env_var: &str) -> Option<PathBuf> {
    explicit
        .filter(|path| !path.as_os_str().is_empty())
        .or_else(|| {
            env::var(env_var)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        })
}
