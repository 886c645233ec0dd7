use std::path::{Path, PathBuf};

use crate::assembler::DatasetAssembler;
use crate::config::{ParsePolicy, resolve_query_file};
use crate::data::{CorpusMap, EvaluationDataset, QueryMap, RelevanceMap};
use crate::errors::AssemblyError;
use crate::hub::DatasetHub;
use crate::variants::{DatasetVariant, TaskMetadata};

/// A code-switching retrieval task: one variant, one query file, one dataset.
pub struct CodeSwitchingTask {
    variant: &'static DatasetVariant,
    assembler: DatasetAssembler,
}

impl CodeSwitchingTask {
    /// Create a task with an explicit query file (strict parsing).
    pub fn new(
        variant: &'static DatasetVariant,
        query_file: Option<PathBuf>,
        hub: impl DatasetHub + 'static,
    ) -> Self {
        let config = variant.assembler_config(query_file, ParsePolicy::Strict);
        Self {
            variant,
            assembler: DatasetAssembler::new(config, hub),
        }
    }

    /// Create a task, falling back to the variant's environment variable for the query file.
    pub fn from_env(
        variant: &'static DatasetVariant,
        query_file: Option<PathBuf>,
        hub: impl DatasetHub + 'static,
    ) -> Self {
        let query_file = resolve_query_file(query_file, variant.query_file_env);
        Self::new(variant, query_file, hub)
    }

    /// Set the malformed-line policy.
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.assembler = self.assembler.with_parse_policy(policy);
        self
    }

    /// Registered task name.
    pub fn name(&self) -> &'static str {
        self.variant.name
    }

    /// Variant parameters.
    pub fn variant(&self) -> &'static DatasetVariant {
        self.variant
    }

    /// Descriptive task metadata.
    pub fn metadata(&self) -> &'static TaskMetadata {
        &self.variant.metadata
    }

    /// Split all accessors read from.
    pub fn eval_split(&self) -> &'static str {
        self.variant.eval_split
    }

    /// Resolved query-file path, if any.
    pub fn query_file(&self) -> Option<&Path> {
        self.assembler.config().query_file.as_deref()
    }

    /// Assemble the dataset once; later calls are no-ops.
    pub fn load_data(&mut self) -> Result<&EvaluationDataset, AssemblyError> {
        if self.query_file().is_none() {
            return Err(AssemblyError::Configuration(format!(
                "query file path not provided for {}; pass a query file or set {}",
                self.variant.name, self.variant.query_file_env
            )));
        }
        self.assembler.load()
    }

    /// True once `load_data` has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.assembler.is_loaded()
    }

    /// Full assembled dataset, once loaded.
    pub fn dataset(&self) -> Option<&EvaluationDataset> {
        self.assembler.dataset()
    }

    /// Queries of the evaluation split, once loaded.
    pub fn queries(&self) -> Option<&QueryMap> {
        self.dataset()?.queries_for(self.eval_split())
    }

    /// Corpus of the evaluation split, once loaded.
    pub fn corpus(&self) -> Option<&CorpusMap> {
        self.dataset()?.corpus_for(self.eval_split())
    }

    /// Relevance judgments of the evaluation split, once loaded.
    pub fn relevant_docs(&self) -> Option<&RelevanceMap> {
        self.dataset()?.relevant_docs_for(self.eval_split())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetRef, PartitionRef};
    use crate::variants::{HAGRID, SCIDOCS};
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::tempdir;

    struct StaticHub;

    impl DatasetHub for StaticHub {
        fn id(&self) -> &str {
            "static"
        }

        fn fetch_rows(
            &self,
            dataset: &DatasetRef,
            partition: &PartitionRef,
        ) -> Result<Vec<Value>, AssemblyError> {
            assert_eq!(dataset.path, "mteb/HagridRetrieval");
            match (partition.config.as_str(), partition.split.as_str()) {
                ("corpus", "dev") => Ok(vec![json!({"_id": "d1", "text": "Paris is the capital."})]),
                ("qrels", "dev") => Ok(vec![json!({"query-id": "q1", "corpus-id": "d1", "score": "1"})]),
                other => panic!("unexpected partition {other:?}"),
            }
        }
    }

    #[test]
    fn accessors_read_the_eval_split() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("hagrid.jsonl");
        fs::write(&path, "{\"id\":\"q1\",\"text\":\"capital de France?\"}\n").unwrap();

        let mut task = CodeSwitchingTask::new(&HAGRID, Some(path), StaticHub);
        assert!(task.queries().is_none());
        task.load_data().unwrap();

        assert_eq!(task.eval_split(), "dev");
        assert_eq!(task.queries().unwrap()["q1"], "capital de France?");
        assert_eq!(task.corpus().unwrap()["d1"].title, "");
        assert_eq!(task.relevant_docs().unwrap()["q1"]["d1"], 1);
    }

    #[test]
    fn missing_query_file_names_the_env_var() {
        let mut task = CodeSwitchingTask::new(&SCIDOCS, None, StaticHub);
        match task.load_data() {
            Err(AssemblyError::Configuration(message)) => {
                assert!(message.contains("SCIDOCS_QUERY_FILE"));
            }
            other => panic!("expected configuration error, got {:?}", other.map(|_| ())),
        }
        assert!(!task.is_loaded());
    }
}
