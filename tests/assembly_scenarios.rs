use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use codeswitch_retrieval::{
    AssemblerConfig, AssemblyError, CorpusDocument, DatasetHub, DatasetRef, ParsePolicy,
    PartitionRef, assemble,
};

/// In-memory hub that records every partition it is asked for.
#[derive(Clone, Default)]
struct RecordingHub {
    corpus: Vec<Value>,
    qrels: Vec<Value>,
    requests: Arc<Mutex<Vec<PartitionRef>>>,
}

impl RecordingHub {
    fn new(corpus: Vec<Value>, qrels: Vec<Value>) -> Self {
        Self {
            corpus,
            qrels,
            requests: Arc::default(),
        }
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl DatasetHub for RecordingHub {
    fn id(&self) -> &str {
        "recording"
    }

    fn fetch_rows(
        &self,
        _dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<Value>, AssemblyError> {
        self.requests.lock().unwrap().push(partition.clone());
        if partition.config == "corpus" {
            Ok(self.corpus.clone())
        } else {
            Ok(self.qrels.clone())
        }
    }
}

fn write_lines(path: &Path, lines: &[&str]) {
    let mut body = lines.join("\n");
    body.push('\n');
    fs::write(path, body).expect("failed writing query file");
}

fn config_for(query_file: Option<PathBuf>) -> AssemblerConfig {
    AssemblerConfig::new(DatasetRef::new("mteb/scidocs", "f8c2fcf0"))
        .with_query_file(query_file)
        .with_target_split("test")
}

fn standard_hub() -> RecordingHub {
    RecordingHub::new(
        vec![json!({"_id": "d1", "title": "T", "text": "body"})],
        vec![json!({"query-id": "q1", "corpus-id": "d1", "score": 2})],
    )
}

#[test]
fn merges_local_queries_with_remote_corpus_and_qrels() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(&path, &[r#"{"id":"q1","text":"hello"}"#]);

    let dataset = assemble(&config_for(Some(path)), &standard_hub()).unwrap();

    assert_eq!(dataset.queries["test"]["q1"], "hello");
    assert_eq!(
        dataset.corpus["test"]["d1"],
        CorpusDocument {
            title: "T".to_string(),
            text: "body".to_string(),
        }
    );
    assert_eq!(dataset.relevant_docs["test"]["q1"]["d1"], 2);
}

#[test]
fn qrels_for_queries_outside_the_local_file_are_dropped() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(&path, &[r#"{"id":"q1","text":"hello"}"#]);

    let hub = RecordingHub::new(
        vec![json!({"_id": "d1", "text": "body"})],
        vec![
            json!({"query-id": "q1", "corpus-id": "d1", "score": 1}),
            json!({"query-id": "q2", "corpus-id": "d1", "score": 1}),
        ],
    );
    let dataset = assemble(&config_for(Some(path)), &hub).unwrap();

    let relevant = &dataset.relevant_docs["test"];
    assert!(relevant.contains_key("q1"));
    assert!(!relevant.contains_key("q2"));
    assert!(relevant.keys().all(|id| dataset.queries["test"].contains_key(id)));
}

#[test]
fn missing_query_file_fails_before_any_remote_fetch() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let hub = standard_hub();

    let result = assemble(&config_for(Some(temp.path().join("absent.jsonl"))), &hub);

    assert!(matches!(result, Err(AssemblyError::NotFound { .. })));
    assert_eq!(hub.request_count(), 0);
}

#[test]
fn unset_query_file_is_a_configuration_error() {
    let hub = standard_hub();
    let result = assemble(&config_for(None), &hub);

    assert!(matches!(result, Err(AssemblyError::Configuration(_))));
    assert_eq!(hub.request_count(), 0);
}

#[test]
fn assembly_is_deterministic() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(
        &path,
        &[
            r#"{"id":"q2","text":"dusra"}"#,
            r#"{"id":"q1","text":"pehla"}"#,
        ],
    );
    let hub = RecordingHub::new(
        vec![
            json!({"_id": "d2", "text": "two"}),
            json!({"_id": "d1", "text": "one"}),
        ],
        vec![
            json!({"query-id": "q1", "corpus-id": "d2", "score": 1}),
            json!({"query-id": "q2", "corpus-id": "d1", "score": 0}),
        ],
    );
    let config = config_for(Some(path));

    let first = serde_json::to_string(&assemble(&config, &hub).unwrap()).unwrap();
    let second = serde_json::to_string(&assemble(&config, &hub).unwrap()).unwrap();
    assert_eq!(first, second);

    let dataset = assemble(&config, &hub).unwrap();
    let order = dataset.queries["test"].keys().cloned().collect::<Vec<_>>();
    assert_eq!(order, vec!["q2", "q1"]);
}

#[test]
fn defaults_fill_missing_fields() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(&path, &[r#"{"_id":7}"#]);

    let hub = RecordingHub::new(
        vec![json!({"id": "d1"})],
        vec![json!({"query-id": "7", "corpus-id": "d1"})],
    );
    let dataset = assemble(&config_for(Some(path)), &hub).unwrap();

    assert_eq!(dataset.queries["test"]["7"], "");
    assert_eq!(dataset.corpus["test"]["d1"], CorpusDocument::default());
    assert_eq!(dataset.relevant_docs["test"]["7"]["d1"], 1);
}

#[test]
fn malformed_line_policy_controls_failure() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(
        &path,
        &[r#"{"id":"q1","text":"hello"}"#, "not json", r#"{"text":"no id"}"#],
    );

    let strict = assemble(&config_for(Some(path.clone())), &standard_hub());
    assert!(matches!(strict, Err(AssemblyError::Parse { line: 2, .. })));

    let lenient = config_for(Some(path)).with_parse_policy(ParsePolicy::Lenient);
    let dataset = assemble(&lenient, &standard_hub()).unwrap();
    assert_eq!(dataset.queries["test"].len(), 1);
    assert_eq!(dataset.relevant_docs["test"]["q1"]["d1"], 2);
}

#[test]
fn corpus_row_without_id_aborts_assembly() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(&path, &[r#"{"id":"q1","text":"hello"}"#]);

    let hub = RecordingHub::new(vec![json!({"title": "orphan"})], Vec::new());
    let result = assemble(&config_for(Some(path)), &hub);

    assert!(matches!(
        result,
        Err(AssemblyError::MalformedRecord {
            source_kind: "corpus",
            ..
        })
    ));
}

#[test]
fn split_without_matching_qrels_is_present_and_empty() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(&path, &[r#"{"id":"q7","text":"koi match nahi"}"#]);

    let dataset = assemble(&config_for(Some(path)), &standard_hub()).unwrap();

    let relevant = dataset
        .relevant_docs
        .get("test")
        .expect("split key present even without judgments");
    assert!(relevant.is_empty());
    assert_eq!(dataset.queries["test"].len(), 1);
    assert_eq!(dataset.corpus["test"].len(), 1);
    assert_eq!(dataset.stats("test").judgments, 0);
}

#[test]
fn repeated_query_id_keeps_first_position_and_last_text() {
    let temp = tempfile::tempdir().expect("failed creating tempdir");
    let path = temp.path().join("queries.jsonl");
    write_lines(
        &path,
        &[
            r#"{"id":"q1","text":"pehla draft"}"#,
            r#"{"id":"q2","text":"doosra"}"#,
            r#"{"_id":"q1","text":"final version"}"#,
        ],
    );

    let dataset = assemble(&config_for(Some(path)), &standard_hub()).unwrap();

    let queries = &dataset.queries["test"];
    assert_eq!(queries.len(), 2);
    assert_eq!(
        queries.iter().collect::<Vec<_>>(),
        vec![
            (&"q1".to_string(), &"final version".to_string()),
            (&"q2".to_string(), &"doosra".to_string()),
        ]
    );
    assert_eq!(dataset.relevant_docs["test"]["q1"]["d1"], 2);
}
