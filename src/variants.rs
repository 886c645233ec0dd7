//! Per-dataset parameter table for the code-switching retrieval tasks.
//!
//! Each variant pins the hub dataset, the partitions holding corpus and
//! qrels, the evaluation split, and the environment variable consulted when no
//! query file is passed explicitly.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{AssemblerConfig, DatasetRef, ParsePolicy, PartitionRef};

/// Descriptive task metadata carried into export manifests.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TaskMetadata {
    /// Human-readable summary.
    pub description: &'static str,
    /// Upstream dataset homepage.
    pub reference: &'static str,
    /// Task category, `t2t` for text-to-text retrieval.
    pub category: &'static str,
    /// Evaluation languages as `lang-Script` codes.
    pub eval_langs: &'static [&'static str],
    /// Headline metric.
    pub main_score: &'static str,
    /// Content domains.
    pub domains: &'static [&'static str],
    /// Dataset license, when published.
    pub license: Option<&'static str>,
    /// Instruction prepended to queries by instruction-tuned encoders.
    pub query_prompt: Option<&'static str>,
}

/// One code-switching retrieval task: dataset coordinates plus metadata.
#[derive(Clone, Copy, Debug)]
pub struct DatasetVariant {
    /// Short CLI key, e.g. `scidocs`.
    pub key: &'static str,
    /// Task name, e.g. `SCIDOCSCodeSwitching`.
    pub name: &'static str,
    /// Hub repository id.
    pub dataset_path: &'static str,
    /// Pinned commit of the hub repository.
    pub revision: &'static str,
    /// `(config, split)` holding corpus documents.
    pub corpus: (&'static str, &'static str),
    /// `(config, split)` holding relevance judgments.
    pub qrels: (&'static str, &'static str),
    /// Split all task accessors read from.
    pub eval_split: &'static str,
    /// Environment fallback for the query-file path.
    pub query_file_env: &'static str,
    /// Descriptive metadata.
    pub metadata: TaskMetadata,
}

impl DatasetVariant {
    /// Dataset reference pinned to this variant's revision.
    pub fn dataset_ref(&self) -> DatasetRef {
        DatasetRef::new(self.dataset_path, self.revision)
    }

    /// Build the assembler configuration for this variant.
    pub fn assembler_config(
        &self,
        query_file: Option<PathBuf>,
        parse_policy: ParsePolicy,
    ) -> AssemblerConfig {
        AssemblerConfig::new(self.dataset_ref())
            .with_query_file(query_file)
            .with_corpus(PartitionRef::new(self.corpus.0, self.corpus.1))
            .with_qrels(PartitionRef::new(self.qrels.0, self.qrels.1))
            .with_target_split(self.eval_split)
            .with_parse_policy(parse_policy)
    }
}

/// SciDocs citation retrieval.
pub static SCIDOCS: DatasetVariant = DatasetVariant {
    key: "scidocs",
    name: "SCIDOCSCodeSwitching",
    dataset_path: "mteb/scidocs",
    revision: "f8c2fcf00f625baaa80f62ec5bd9e1fff3b8ae88",
    corpus: ("corpus", "corpus"),
    qrels: ("default", "test"),
    eval_split: "test",
    query_file_env: "SCIDOCS_QUERY_FILE",
    metadata: TaskMetadata {
        description: "SCIDOCS Code-Switching variant with custom queries. SciDocs is an evaluation benchmark of seven document-level tasks ranging from citation prediction to document classification and recommendation. Corpus and qrels are loaded from the official dataset.",
        reference: "https://allenai.org/data/scidocs",
        category: "t2t",
        eval_langs: &["eng-Latn"],
        main_score: "ndcg_at_10",
        domains: &["Academic", "Written", "Non-fiction"],
        license: Some("cc-by-sa-4.0"),
        query_prompt: Some(
            "Given a scientific paper title, retrieve paper abstracts that are cited by the given paper",
        ),
    },
};

/// HAGRID attributable QA retrieval, evaluated on `dev`.
pub static HAGRID: DatasetVariant = DatasetVariant {
    key: "hagrid",
    name: "HagridRetrievalCodeSwitching",
    dataset_path: "mteb/HagridRetrieval",
    revision: "ae4f8bebcb82af2028863b778e1eebf4f5f23628",
    corpus: ("corpus", "dev"),
    qrels: ("qrels", "dev"),
    eval_split: "dev",
    query_file_env: "HAGRID_QUERY_FILE",
    metadata: TaskMetadata {
        description: "HAGRID Code-Switching variant with custom queries. HAGRID (Human-in-the-loop Attributable Generative Retrieval for Information-seeking Dataset) is a dataset for generative information-seeking scenarios. Corpus and qrels are loaded from the official dataset.",
        reference: "https://github.com/project-miracl/hagrid",
        category: "t2t",
        eval_langs: &["eng-Latn"],
        main_score: "ndcg_at_10",
        domains: &["Encyclopaedic", "Written"],
        license: Some("apache-2.0"),
        query_prompt: None,
    },
};

/// AILA statute retrieval.
pub static AILA_STATUTES: DatasetVariant = DatasetVariant {
    key: "aila-statutes",
    name: "AILAStatutesCodeSwitching",
    dataset_path: "mteb/AILA_statutes",
    revision: "ebfcd844eadd3d667efa3c57fc5c8c87f5c2867e",
    corpus: ("corpus", "corpus"),
    qrels: ("default", "test"),
    eval_split: "test",
    query_file_env: "AILA_STATUTES_QUERY_FILE",
    metadata: TaskMetadata {
        description: "AILA Statutes variant with code-switching queries. Corpus and qrels are loaded from the official dataset.",
        reference: "https://zenodo.org/records/4063986",
        category: "t2t",
        eval_langs: &["eng-Latn"],
        main_score: "ndcg_at_10",
        domains: &["Legal", "Written"],
        license: Some("cc-by-4.0"),
        query_prompt: None,
    },
};

/// TREC-COVID biomedical retrieval.
pub static TREC_COVID: DatasetVariant = DatasetVariant {
    key: "trec-covid",
    name: "TRECCOVIDCodeSwitching",
    dataset_path: "mteb/trec-covid",
    revision: "bb9466bac8153a0349341eb1b22e06409e78ef4e",
    corpus: ("corpus", "corpus"),
    qrels: ("default", "test"),
    eval_split: "test",
    query_file_env: "TRECCOVID_QUERY_FILE",
    metadata: TaskMetadata {
        description: "TREC-COVID variant with code-switching queries. Corpus and qrels are loaded from the official dataset.",
        reference: "https://ir.nist.gov/covidSubmit/index.html",
        category: "t2t",
        eval_langs: &["eng-Latn"],
        main_score: "ndcg_at_10",
        domains: &["Medical", "Academic", "Written"],
        license: None,
        query_prompt: Some("Given a query on COVID-19, retrieve documents that answer the query"),
    },
};

/// Every registered variant, in CLI listing order.
pub static ALL_VARIANTS: [&DatasetVariant; 4] = [&SCIDOCS, &HAGRID, &AILA_STATUTES, &TREC_COVID];

/// Look up a variant by CLI key or task name (case-insensitive).
pub fn find_variant(name: &str) -> Option<&'static DatasetVariant> {
    let needle = name.trim();
    ALL_VARIANTS.into_iter().find(|variant| {
        variant.key.eq_ignore_ascii_case(needle) || variant.name.eq_ignore_ascii_case(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn variant_lookup_accepts_key_and_task_name() {
        assert_eq!(find_variant("hagrid").map(|v| v.name), Some("HagridRetrievalCodeSwitching"));
        assert_eq!(find_variant("trecCovidCodeSwitching").map(|v| v.key), Some("trec-covid"));
        assert!(find_variant("nfcorpus").is_none());
    }

    #[test]
    fn variants_have_distinct_env_vars_and_keys() {
        let envs = ALL_VARIANTS.iter().map(|v| v.query_file_env).collect::<HashSet<_>>();
        let keys = ALL_VARIANTS.iter().map(|v| v.key).collect::<HashSet<_>>();
        assert_eq!(envs.len(), ALL_VARIANTS.len());
        assert_eq!(keys.len(), ALL_VARIANTS.len());
    }

    #[test]
    fn hagrid_reads_dev_partitions() {
        let config = HAGRID.assembler_config(None, ParsePolicy::Strict);
        assert_eq!(config.corpus, PartitionRef::new("corpus", "dev"));
        assert_eq!(config.qrels, PartitionRef::new("qrels", "dev"));
        assert_eq!(config.target_split, "dev");
        assert_eq!(config.dataset.revision, HAGRID.revision);
    }
}
