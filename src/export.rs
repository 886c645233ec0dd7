//! Write an assembled split to disk in BEIR layout.
//!
//! ```text
//! <out>/queries.jsonl        {"_id", "text"} per line
//! <out>/corpus.jsonl         {"_id", "title", "text"} per line
//! <out>/qrels/<split>.tsv    query-id<TAB>corpus-id<TAB>score
//! <out>/manifest.json        task metadata, dataset pin, record counts
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::export::{CORPUS_FILE, MANIFEST_FILE, QRELS_DIR, QRELS_HEADER, QUERIES_FILE};
use crate::data::{DatasetStats, EvaluationDataset};
use crate::errors::AssemblyError;
use crate::task::CodeSwitchingTask;
use crate::variants::TaskMetadata;

#[derive(Serialize)]
struct QueryLine<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct CorpusLine<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    title: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct ExportManifest<'a> {
    task: &'a str,
    dataset: &'a str,
    revision: &'a str,
    split: &'a str,
    query_file: Option<String>,
    assembled_at: DateTime<Utc>,
    stats: DatasetStats,
    metadata: &'a TaskMetadata,
}

/// Paths written by an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFiles {
    /// `queries.jsonl`.
    pub queries: PathBuf,
    /// `corpus.jsonl`.
    pub corpus: PathBuf,
    /// `qrels/<split>.tsv`.
    pub qrels: PathBuf,
    /// Present only for task exports.
    pub manifest: Option<PathBuf>,
}

fn create(path: &Path) -> Result<BufWriter<File>, AssemblyError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|err| AssemblyError::Export(format!("failed to create {}: {err}", path.display())))
}

fn write_json_line<T: Serialize>(
    writer: &mut BufWriter<File>,
    value: &T,
) -> Result<(), AssemblyError> {
    serde_json::to_writer(&mut *writer, value)
        .map_err(|err| AssemblyError::Export(err.to_string()))?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write queries, corpus, and qrels of `split` under `out_dir`.
///
/// Records are written in map order, so exporting the same dataset twice
/// produces identical files.
pub fn write_dataset(
    dataset: &EvaluationDataset,
    split: &str,
    out_dir: &Path,
) -> Result<ExportedFiles, AssemblyError> {
    let queries = dataset.queries_for(split).ok_or_else(|| {
        AssemblyError::Export(format!("split '{split}' is not present in the dataset"))
    })?;
    fs::create_dir_all(out_dir.join(QRELS_DIR))?;

    let queries_path = out_dir.join(QUERIES_FILE);
    let mut writer = create(&queries_path)?;
    for (id, text) in queries {
        write_json_line(&mut writer, &QueryLine { id, text })?;
    }
    writer.flush()?;

    let corpus_path = out_dir.join(CORPUS_FILE);
    let mut writer = create(&corpus_path)?;
    for (id, document) in dataset.corpus_for(split).into_iter().flatten() {
        let line = CorpusLine {
            id,
            title: &document.title,
            text: &document.text,
        };
        write_json_line(&mut writer, &line)?;
    }
    writer.flush()?;

    let qrels_path = out_dir.join(QRELS_DIR).join(format!("{split}.tsv"));
    let mut writer = create(&qrels_path)?;
    writeln!(writer, "{QRELS_HEADER}")?;
    for (query_id, judged) in dataset.relevant_docs_for(split).into_iter().flatten() {
        for (doc_id, score) in judged {
            writeln!(writer, "{query_id}\t{doc_id}\t{score}")?;
        }
    }
    writer.flush()?;

    Ok(ExportedFiles {
        queries: queries_path,
        corpus: corpus_path,
        qrels: qrels_path,
        manifest: None,
    })
}

/// Export a loaded task's evaluation split together with a manifest.
pub fn export_task(
    task: &CodeSwitchingTask,
    out_dir: &Path,
) -> Result<ExportedFiles, AssemblyError> {
    let dataset = task.dataset().ok_or_else(|| {
        AssemblyError::Export(format!("{} has not been loaded", task.name()))
    })?;
    let split = task.eval_split();
    let mut files = write_dataset(dataset, split, out_dir)?;

    let variant = task.variant();
    let manifest = ExportManifest {
        task: variant.name,
        dataset: variant.dataset_path,
        revision: variant.revision,
        split,
        query_file: task.query_file().map(|path| path.display().to_string()),
        assembled_at: Utc::now(),
        stats: dataset.stats(split),
        metadata: task.metadata(),
    };
    let manifest_path = out_dir.join(MANIFEST_FILE);
    let mut writer = create(&manifest_path)?;
    serde_json::to_writer_pretty(&mut writer, &manifest)
        .map_err(|err| AssemblyError::Export(err.to_string()))?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(
        "[codeswitch:export] wrote {} ({} queries, {} documents, {} judgments) to {}",
        variant.name,
        manifest.stats.queries,
        manifest.stats.documents,
        manifest.stats.judgments,
        out_dir.display()
    );
    files.manifest = Some(manifest_path);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CorpusDocument, QrelEntry, QueryRecord};
    use serde_json::Value;
    use tempfile::tempdir;

    fn sample() -> EvaluationDataset {
        let mut dataset = EvaluationDataset::with_split("test");
        dataset.insert_query(
            "test",
            QueryRecord {
                id: "q1".to_string(),
                text: "kya hai \"RAG\"?".to_string(),
            },
        );
        dataset.insert_document(
            "test",
            "d1".to_string(),
            CorpusDocument {
                title: "Retrieval".to_string(),
                text: "line one\nline two".to_string(),
            },
        );
        dataset.insert_judgment(
            "test",
            QrelEntry {
                query_id: "q1".to_string(),
                doc_id: "d1".to_string(),
                score: 2,
            },
        );
        dataset
    }

    #[test]
    fn writes_beir_layout() {
        let temp = tempdir().unwrap();
        let files = write_dataset(&sample(), "test", temp.path()).unwrap();

        let queries = fs::read_to_string(&files.queries).unwrap();
        let line: Value = serde_json::from_str(queries.trim_end()).unwrap();
        assert_eq!(line["_id"], "q1");
        assert_eq!(line["text"], "kya hai \"RAG\"?");

        let corpus = fs::read_to_string(&files.corpus).unwrap();
        assert_eq!(corpus.lines().count(), 1);
        let line: Value = serde_json::from_str(corpus.trim_end()).unwrap();
        assert_eq!(line["title"], "Retrieval");
        assert_eq!(line["text"], "line one\nline two");

        assert_eq!(files.qrels, temp.path().join("qrels/test.tsv"));
        assert_eq!(
            fs::read_to_string(&files.qrels).unwrap(),
            "query-id\tcorpus-id\tscore\nq1\td1\t2\n"
        );
        assert!(files.manifest.is_none());
    }

    #[test]
    fn unknown_split_is_an_export_error() {
        let temp = tempdir().unwrap();
        assert!(matches!(
            write_dataset(&sample(), "dev", temp.path()),
            Err(AssemblyError::Export(_))
        ));
    }
}
