/// Field names recognized in query, corpus, and qrels records.
pub mod fields {
    /// Primary query id field; fallback corpus id field.
    pub const ID: &str = "id";
    /// BEIR-style id field; primary for corpus rows, fallback for queries.
    pub const UNDERSCORE_ID: &str = "_id";
    /// Body text field for queries and documents.
    pub const TEXT: &str = "text";
    /// Document title field.
    pub const TITLE: &str = "title";
    /// Query id column of a qrels row.
    pub const QUERY_ID: &str = "query-id";
    /// Document id column of a qrels row.
    pub const CORPUS_ID: &str = "corpus-id";
    /// Relevance score column of a qrels row.
    pub const SCORE: &str = "score";
}

/// Constants used by the remote and snapshot hubs.
pub mod hub {
    /// Shard file extensions decoded by default.
    pub const SHARD_EXTENSIONS: [&str; 4] = ["parquet", "jsonl", "ndjson", "tsv"];
    /// Dataset config name that does not need to appear in shard paths.
    pub const DEFAULT_CONFIG: &str = "default";
    /// Datasets-server endpoint listing converted parquet shards.
    pub const PARQUET_MANIFEST_ENDPOINT: &str = "https://datasets-server.huggingface.co/parquet";
    /// Subdirectory of the cache dir used for manifest downloads.
    pub const MANIFEST_CACHE_DIR: &str = "_parquet_manifest";
    /// Retries requested from the hf-hub client.
    pub const HF_HUB_RETRIES: usize = 5;
    /// Environment variable holding an optional hub access token.
    pub const HF_TOKEN_ENV: &str = "HF_TOKEN";
}

/// Constants used by dataset export.
pub mod export {
    /// Query file written in the export directory.
    pub const QUERIES_FILE: &str = "queries.jsonl";
    /// Corpus file written in the export directory.
    pub const CORPUS_FILE: &str = "corpus.jsonl";
    /// Directory holding one qrels TSV per split.
    pub const QRELS_DIR: &str = "qrels";
    /// Manifest describing the exported task.
    pub const MANIFEST_FILE: &str = "manifest.json";
    /// Header row of exported qrels files.
    pub const QRELS_HEADER: &str = "query-id\tcorpus-id\tscore";
}

/// Relevance score applied when a qrels row omits `score`.
pub const DEFAULT_RELEVANCE_SCORE: i64 = 1;
