//! Merge a local query file with a remote corpus and qrels.
//!
//! Assembly runs three passes in order: queries from the local file, corpus
//! documents, then relevance judgments. A judgment is kept only when its query
//! id was loaded by the query pass; the local file defines the active query set.

use std::time::Instant;
use tracing::{debug, info};

use crate::config::{AssemblerConfig, ParsePolicy};
use crate::data::EvaluationDataset;
use crate::errors::AssemblyError;
use crate::hub::DatasetHub;
use crate::query_file::load_queries;
use crate::records::{resolve_document, resolve_qrel};

/// Build an `EvaluationDataset` from `config`, fetching corpus and qrels through `hub`.
///
/// The query file is validated and read before any remote fetch. A failure in
/// any pass aborts assembly; nothing partial is returned.
pub fn assemble(
    config: &AssemblerConfig,
    hub: &dyn DatasetHub,
) -> Result<EvaluationDataset, AssemblyError> {
    let started = Instant::now();
    let query_file = config
        .query_file
        .as_deref()
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or_else(|| AssemblyError::Configuration("query file path not provided".to_string()))?;
    if !query_file.exists() {
        return Err(AssemblyError::NotFound {
            path: query_file.to_path_buf(),
        });
    }

    info!(
        "[codeswitch:assemble] loading queries from local file {}",
        query_file.display()
    );
    let queries = load_queries(query_file, config.parse_policy)?;

    info!(
        "[codeswitch:assemble] loading corpus from {} ({}) via {}",
        config.dataset.path,
        config.dataset.revision,
        hub.id()
    );
    let corpus_rows = hub.fetch_rows(&config.dataset, &config.corpus)?;

    info!(
        "[codeswitch:assemble] loading qrels from {} ({}) via {}",
        config.dataset.path,
        config.dataset.revision,
        hub.id()
    );
    let qrels_rows = hub.fetch_rows(&config.dataset, &config.qrels)?;

    let split = config.target_split.as_str();
    let mut dataset = EvaluationDataset::with_split(split);

    for record in queries {
        dataset.insert_query(split, record);
    }

    for row in &corpus_rows {
        let (id, document) = resolve_document(row)?;
        dataset.insert_document(split, id, document);
    }

    let mut dropped = 0usize;
    for row in &qrels_rows {
        let qrel = resolve_qrel(row)?;
        if !dataset.insert_judgment(split, qrel) {
            dropped += 1;
        }
    }

    let stats = dataset.stats(split);
    info!(
        "[codeswitch:assemble] loaded {} queries from local file",
        stats.queries
    );
    info!("[codeswitch:assemble] loaded {} documents", stats.documents);
    info!(
        "[codeswitch:assemble] loaded {} judged queries ({} query-document pairs)",
        stats.judged_queries, stats.judgments
    );
    debug!(
        "[codeswitch:assemble] dropped {} qrels rows for queries outside the local file; split '{}' ready in {:.2}s",
        dropped,
        split,
        started.elapsed().as_secs_f64()
    );
    Ok(dataset)
}

/// Owns one assembly configuration and its assembled dataset.
///
/// `load` assembles on the first call and returns the cached dataset on every
/// later call without touching the hub again.
pub struct DatasetAssembler {
    config: AssemblerConfig,
    hub: Box<dyn DatasetHub>,
    dataset: Option<EvaluationDataset>,
}

impl DatasetAssembler {
    /// Create an assembler; nothing is read until `load`.
    pub fn new(config: AssemblerConfig, hub: impl DatasetHub + 'static) -> Self {
        Self {
            config,
            hub: Box::new(hub),
            dataset: None,
        }
    }

    /// Replace the malformed-line policy, discarding any loaded dataset.
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.config.parse_policy = policy;
        self.dataset = None;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Assemble once, then return the cached dataset.
    pub fn load(&mut self) -> Result<&EvaluationDataset, AssemblyError> {
        let dataset = match self.dataset.take() {
            Some(dataset) => {
                debug!(
                    "[codeswitch:assemble] dataset for {} already loaded; skipping",
                    self.config.dataset.path
                );
                dataset
            }
            None => assemble(&self.config, self.hub.as_ref())?,
        };
        Ok(&*self.dataset.insert(dataset))
    }

    /// True once `load` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Assembled dataset, if loaded.
    pub fn dataset(&self) -> Option<&EvaluationDataset> {
        self.dataset.as_ref()
    }

    /// Consume the assembler, returning the dataset if loaded.
    pub fn into_dataset(self) -> Option<EvaluationDataset> {
        self.dataset
    }
}
