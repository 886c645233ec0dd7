use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::shards::read_shard_rows;
use super::{DatasetHub, default_shard_extensions, select_partition_files};
use crate::config::{DatasetRef, PartitionRef};
use crate::errors::AssemblyError;
use crate::types::RemoteFile;

/// Hub backed by a local snapshot directory.
///
/// Files for `org/name` live under `<root>/org/name/`. When a
/// `<root>/org/name/<revision>/` directory exists it is used instead, so
/// several pinned revisions can sit side by side.
pub struct SnapshotHub {
    root: PathBuf,
    shard_extensions: Vec<String>,
    follow_links: bool,
}

impl SnapshotHub {
    /// Create a hub rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            shard_extensions: default_shard_extensions(),
            follow_links: true,
        }
    }

    /// Restrict the shard extensions considered.
    pub fn with_shard_extensions(mut self, extensions: Vec<String>) -> Self {
        self.shard_extensions = extensions;
        self
    }

    /// Configure symlink traversal.
    pub fn with_follow_symlinks(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Snapshot root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dataset_dir(&self, dataset: &DatasetRef) -> Option<PathBuf> {
        let base = self.root.join(&dataset.path);
        if !dataset.revision.is_empty() {
            let pinned = base.join(&dataset.revision);
            if pinned.is_dir() {
                return Some(pinned);
            }
        }
        base.is_dir().then_some(base)
    }

    fn list_files(&self, dir: &Path) -> Vec<RemoteFile> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
        {
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            let parts = relative
                .components()
                .map(|part| part.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>();
            files.push(parts.join("/"));
        }
        files
    }
}

impl DatasetHub for SnapshotHub {
    fn id(&self) -> &str {
        "snapshot"
    }

    fn fetch_rows(
        &self,
        dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<Value>, AssemblyError> {
        let dir = self.dataset_dir(dataset).ok_or_else(|| {
            AssemblyError::remote(
                &dataset.path,
                format!(
                    "no local snapshot for dataset under {}",
                    self.root.display()
                ),
            )
        })?;

        let files = self.list_files(&dir);
        let selected = select_partition_files(&files, partition, &self.shard_extensions);
        if selected.is_empty() {
            warn!(
                "[codeswitch:snapshot] {} local files scanned under {}, none matched config='{}' split='{}'",
                files.len(),
                dir.display(),
                partition.config,
                partition.split
            );
            return Err(AssemblyError::remote(
                &dataset.path,
                format!(
                    "no shard files for config '{}' split '{}' under {}",
                    partition.config,
                    partition.split,
                    dir.display()
                ),
            ));
        }

        let mut rows = Vec::new();
        for file in &selected {
            rows.extend(read_shard_rows(&dataset.path, &dir.join(file))?);
        }
        info!(
            "[codeswitch:snapshot] {} {}/{}: {} rows from {} shard(s)",
            dataset.path,
            partition.config,
            partition.split,
            rows.len(),
            selected.len()
        );
        Ok(rows)
    }
}
