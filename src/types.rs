/// Split name used to key every evaluation map.
/// Examples: `test`, `dev`
pub type SplitName = String;
/// Query identifier resolved from a local query record.
/// Examples: `q1`, `1`, `PLAINTEXT-1024`
pub type QueryId = String;
/// Corpus document identifier resolved from a remote corpus row.
/// Examples: `d1`, `ug7v899j`
pub type DocId = String;
/// Graded relevance judgment after integer coercion.
/// Examples: `0`, `1`, `2`
pub type RelevanceScore = i64;
/// Remote dataset repository id on the hub.
/// Examples: `mteb/scidocs`, `mteb/HagridRetrieval`
pub type DatasetPath = String;
/// Pinned repository revision (commit sha or branch).
/// Example: `f8c2fcf00f625baaa80f62ec5bd9e1fff3b8ae88`
pub type Revision = String;
/// Repository-relative file path of a remote shard.
/// Examples: `corpus/corpus-00000-of-00001.parquet`, `qrels/test.tsv`
pub type RemoteFile = String;
