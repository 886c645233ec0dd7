#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Dataset assembly: local queries merged with remote corpus and qrels.
pub mod assembler;
/// Command-line runner behind `codeswitch-assemble`.
pub mod cli;
/// Assembly configuration types.
pub mod config;
/// Centralized constants for record fields, hubs, and export.
pub mod constants;
/// Assembled dataset types.
pub mod data;
/// BEIR-layout export of assembled splits.
pub mod export;
/// Remote dataset hubs and shard decoding.
pub mod hub;
/// Local query-file reader.
pub mod query_file;
/// Field resolution for query, corpus, and qrels records.
pub mod records;
/// Code-switching task wrapper with lazy loading.
pub mod task;
/// Shared type aliases.
pub mod types;
/// Registered dataset variants.
pub mod variants;

mod errors;

pub use assembler::{DatasetAssembler, assemble};
pub use config::{AssemblerConfig, DatasetRef, ParsePolicy, PartitionRef};
pub use data::{
    CorpusDocument, CorpusMap, DatasetStats, EvaluationDataset, QrelEntry, QueryMap, QueryRecord,
    RelevanceMap,
};
pub use errors::AssemblyError;
pub use export::{ExportedFiles, export_task, write_dataset};
pub use hub::{DatasetHub, SnapshotHub};
#[cfg(feature = "huggingface")]
pub use hub::{HubConfig, HuggingFaceHub};
pub use task::CodeSwitchingTask;
pub use types::{DatasetPath, DocId, QueryId, RelevanceScore, RemoteFile, Revision, SplitName};
pub use variants::{ALL_VARIANTS, DatasetVariant, TaskMetadata, find_variant};
