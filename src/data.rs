use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{DocId, QueryId, RelevanceScore, SplitName};

/// A query resolved from the local query file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryRecord {
    /// Resolved from `id`, falling back to `_id`.
    pub id: QueryId,
    /// Query text; empty when the line has none.
    pub text: String,
}

/// A corpus document resolved from the remote corpus partition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    /// Document title; empty when the row has none.
    pub title: String,
    /// Document body; empty when the row has none.
    pub text: String,
}

/// A relevance judgment resolved from the remote qrels partition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrelEntry {
    /// `query-id` column.
    pub query_id: QueryId,
    /// `corpus-id` column.
    pub doc_id: DocId,
    /// Integer-coerced `score` column.
    pub score: RelevanceScore,
}

/// Query text keyed by query id.
pub type QueryMap = IndexMap<QueryId, String>;
/// Documents keyed by document id.
pub type CorpusMap = IndexMap<DocId, CorpusDocument>;
/// Graded judgments keyed by query id, then document id.
pub type RelevanceMap = IndexMap<QueryId, IndexMap<DocId, RelevanceScore>>;

/// Queries, corpus, and relevance judgments, each keyed by split name.
///
/// Maps keep insertion order. A repeated id keeps its first position and takes
/// the value written last.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationDataset {
    /// Query text per split.
    pub queries: IndexMap<SplitName, QueryMap>,
    /// Corpus documents per split.
    pub corpus: IndexMap<SplitName, CorpusMap>,
    /// Relevance judgments per split.
    pub relevant_docs: IndexMap<SplitName, RelevanceMap>,
}

/// Record counts for one split of an `EvaluationDataset`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    /// Loaded queries.
    pub queries: usize,
    /// Loaded corpus documents.
    pub documents: usize,
    /// Queries with at least one retained judgment.
    pub judged_queries: usize,
    /// Total retained `(query, document)` judgment pairs.
    pub judgments: usize,
}

impl EvaluationDataset {
    /// Create empty maps for `split` in all three collections.
    pub fn with_split(split: &str) -> Self {
        let mut dataset = Self::default();
        dataset.queries.insert(split.to_string(), QueryMap::new());
        dataset.corpus.insert(split.to_string(), CorpusMap::new());
        dataset
            .relevant_docs
            .insert(split.to_string(), RelevanceMap::new());
        dataset
    }

    /// Store a query, replacing the text of an existing id.
    pub fn insert_query(&mut self, split: &str, record: QueryRecord) {
        self.queries
            .entry(split.to_string())
            .or_default()
            .insert(record.id, record.text);
    }

    /// Store a corpus document, replacing an existing id.
    pub fn insert_document(&mut self, split: &str, id: DocId, document: CorpusDocument) {
        self.corpus
            .entry(split.to_string())
            .or_default()
            .insert(id, document);
    }

    /// Store a judgment when its query exists in `split`.
    ///
    /// Returns `false` (and stores nothing) for judgments whose query is not
    /// part of the loaded query set.
    pub fn insert_judgment(&mut self, split: &str, qrel: QrelEntry) -> bool {
        let known = self
            .queries
            .get(split)
            .is_some_and(|queries| queries.contains_key(&qrel.query_id));
        if !known {
            return false;
        }
        self.relevant_docs
            .entry(split.to_string())
            .or_default()
            .entry(qrel.query_id)
            .or_default()
            .insert(qrel.doc_id, qrel.score);
        true
    }

    /// Queries of `split`, if the split exists.
    pub fn queries_for(&self, split: &str) -> Option<&QueryMap> {
        self.queries.get(split)
    }

    /// Corpus of `split`, if the split exists.
    pub fn corpus_for(&self, split: &str) -> Option<&CorpusMap> {
        self.corpus.get(split)
    }

    /// Relevance judgments of `split`, if the split exists.
    pub fn relevant_docs_for(&self, split: &str) -> Option<&RelevanceMap> {
        self.relevant_docs.get(split)
    }

    /// Split names present in the query map, in insertion order.
    pub fn splits(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    /// Count records for `split`; missing splits count as empty.
    pub fn stats(&self, split: &str) -> DatasetStats {
        let relevant = self.relevant_docs.get(split);
        DatasetStats {
            queries: self.queries.get(split).map_or(0, |queries| queries.len()),
            documents: self.corpus.get(split).map_or(0, |corpus| corpus.len()),
            judged_queries: relevant.map_or(0, |by_query| by_query.len()),
            judgments: relevant.map_or(0, |by_query| {
                by_query.values().map(|by_doc| by_doc.len()).sum()
            }),
        }
    }
}
