use hf_hub::api::sync::{Api, ApiBuilder};
use hf_hub::{Cache, Repo, RepoType};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::shards::read_shard_rows;
use super::{DatasetHub, default_shard_extensions, normalized_extensions, select_partition_files};
use crate::config::{DatasetRef, PartitionRef};
use crate::constants::hub::{HF_HUB_RETRIES, MANIFEST_CACHE_DIR, PARQUET_MANIFEST_ENDPOINT};
use crate::errors::AssemblyError;
use crate::types::RemoteFile;

/// Settings for the Hugging Face hub client.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Cache directory. `None` uses the hf-hub default (`HF_HOME`).
    pub cache_dir: Option<PathBuf>,
    /// Access token for gated or private datasets.
    pub token: Option<String>,
    /// File extensions accepted as shard files.
    pub shard_extensions: Vec<String>,
    /// Show hf-hub download progress bars.
    pub progress: bool,
    /// Datasets-server parquet manifest endpoint.
    pub manifest_endpoint: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            token: None,
            shard_extensions: default_shard_extensions(),
            progress: true,
            manifest_endpoint: PARQUET_MANIFEST_ENDPOINT.to_string(),
        }
    }
}

/// One parquet file listed by the datasets-server manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
struct ManifestShard {
    url: String,
    size: Option<u64>,
}

impl ManifestShard {
    /// Cache location: the URL path after `/resolve/` (revision and file path)
    /// under `<cache>/_parquet_manifest/<dataset>/`.
    fn cache_path(&self, cache_root: &Path, dataset: &str) -> PathBuf {
        let base = cache_root.join(MANIFEST_CACHE_DIR).join(dataset);
        let resolved = self
            .url
            .split_once("/resolve/")
            .map(|(_, rest)| rest.trim_start_matches('/'))
            .filter(|rest| !rest.is_empty());
        match resolved {
            Some(rest) => base.join(rest),
            None => {
                let name = self
                    .url
                    .split(['?', '#'])
                    .next()
                    .and_then(|path| path.rsplit('/').next())
                    .filter(|name| !name.is_empty())
                    .unwrap_or("shard.parquet");
                base.join("unresolved").join(name)
            }
        }
    }

    /// A cached copy counts only when it is a file of the listed size.
    fn is_cached_at(&self, target: &Path) -> bool {
        let Ok(meta) = fs::metadata(target) else {
            return false;
        };
        match self.size {
            Some(expected) if expected > 0 => meta.is_file() && meta.len() == expected,
            _ => meta.is_file(),
        }
    }
}

/// Hub client that resolves partitions at a pinned revision.
///
/// Repository files are listed at the pinned revision and fetched through the
/// hf-hub cache. When the listing has no file for a partition (datasets shipped
/// only through a loading script or parquet conversion) the datasets-server
/// parquet manifest is used instead. That manifest tracks the converted
/// branch, not the pinned revision.
pub struct HuggingFaceHub {
    config: HubConfig,
    api: Api,
}

impl HuggingFaceHub {
    /// Build a hub client.
    pub fn new(config: HubConfig) -> Result<Self, AssemblyError> {
        let mut builder = ApiBuilder::new()
            .with_progress(config.progress)
            .with_retries(HF_HUB_RETRIES)
            .with_token(config.token.clone());
        if let Some(cache_dir) = &config.cache_dir {
            builder = builder.with_cache_dir(cache_dir.clone());
        }
        let api = builder.build().map_err(|err| {
            AssemblyError::remote("<hub>", format!("failed building hf-hub client: {err}"))
        })?;
        Ok(Self { config, api })
    }

    fn cache_root(&self) -> PathBuf {
        self.config
            .cache_dir
            .clone()
            .unwrap_or_else(|| Cache::from_env().path().clone())
    }

    fn list_pinned_files(&self, dataset: &DatasetRef) -> Result<Vec<RemoteFile>, AssemblyError> {
        let repo = self.api.repo(Repo::with_revision(
            dataset.path.clone(),
            RepoType::Dataset,
            dataset.revision.clone(),
        ));
        info!(
            "[codeswitch:hf] reading remote file list for dataset {}@{}",
            dataset.path, dataset.revision
        );
        let info = repo.info().map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!(
                    "failed reading repository info at revision {}: {err}",
                    dataset.revision
                ),
            )
        })?;
        Ok(info
            .siblings
            .into_iter()
            .map(|entry| entry.rfilename)
            .collect())
    }

    fn fetch_pinned_file(
        &self,
        dataset: &DatasetRef,
        file: &str,
    ) -> Result<PathBuf, AssemblyError> {
        let repo = self.api.repo(Repo::with_revision(
            dataset.path.clone(),
            RepoType::Dataset,
            dataset.revision.clone(),
        ));
        let local = repo.get(file).map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!("failed downloading '{file}' from hf-hub: {err}"),
            )
        })?;
        if !local.exists() {
            return Err(AssemblyError::remote(
                &dataset.path,
                format!(
                    "hf-hub returned non-existent cache file for '{file}' at {}",
                    local.display()
                ),
            ));
        }
        Ok(local)
    }

    fn manifest_shards(
        &self,
        dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<ManifestShard>, AssemblyError> {
        info!(
            "[codeswitch:hf] reading datasets-server parquet manifest for {} {}/{}",
            dataset.path, partition.config, partition.split
        );
        let response = ureq::get(&self.config.manifest_endpoint)
            .query("dataset", &dataset.path)
            .query("config", &partition.config)
            .query("split", &partition.split)
            .call()
            .map_err(|err| {
                AssemblyError::remote(
                    &dataset.path,
                    format!("failed querying datasets-server parquet endpoint: {err}"),
                )
            })?;
        let body = response.into_body().read_to_string().map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!("failed reading datasets-server parquet response body: {err}"),
            )
        })?;
        let json: Value = serde_json::from_str(&body).map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!("failed parsing datasets-server parquet response: {err}"),
            )
        })?;
        Ok(parse_manifest(&json, partition, &self.config.shard_extensions))
    }

    fn download_manifest_shard(
        &self,
        dataset: &DatasetRef,
        shard: &ManifestShard,
    ) -> Result<PathBuf, AssemblyError> {
        let target = shard.cache_path(&self.cache_root(), &dataset.path);
        if shard.is_cached_at(&target) {
            debug!("[codeswitch:hf] reusing cached shard {}", target.display());
            return Ok(target);
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                AssemblyError::remote(
                    &dataset.path,
                    format!("failed creating cache dir {}: {err}", parent.display()),
                )
            })?;
        }

        let temp_target = target.with_extension("part");
        if temp_target.exists() {
            let _ = fs::remove_file(&temp_target);
        }

        let response = ureq::get(&shard.url).call().map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!("failed downloading shard URL '{}': {err}", shard.url),
            )
        })?;
        let mut reader = response.into_body().into_reader();
        let mut file = File::create(&temp_target).map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!("failed creating {}: {err}", temp_target.display()),
            )
        })?;

        info!(
            "[codeswitch:hf] downloading shard payload -> {}",
            target.display()
        );
        let started = Instant::now();
        let mut last_report = Instant::now();
        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 1024 * 1024];
        loop {
            let read = reader.read(&mut buffer).map_err(|err| {
                AssemblyError::remote(
                    &dataset.path,
                    format!("failed reading shard stream '{}': {err}", shard.url),
                )
            })?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read]).map_err(|err| {
                AssemblyError::remote(
                    &dataset.path,
                    format!("failed writing {}: {err}", temp_target.display()),
                )
            })?;
            total_bytes = total_bytes.saturating_add(read as u64);
            if last_report.elapsed() >= Duration::from_secs(2) {
                info!(
                    "[codeswitch:hf] download progress {}: {:.1} MiB ({:.1}s)",
                    target.display(),
                    total_bytes as f64 / (1024.0 * 1024.0),
                    started.elapsed().as_secs_f64()
                );
                last_report = Instant::now();
            }
        }
        file.flush()?;
        drop(file);

        if let Some(expected) = shard.size
            && expected > 0
            && expected != total_bytes
        {
            let _ = fs::remove_file(&temp_target);
            return Err(AssemblyError::remote(
                &dataset.path,
                format!(
                    "shard '{}' truncated: received {total_bytes} of {expected} bytes",
                    shard.url
                ),
            ));
        }

        fs::rename(&temp_target, &target).map_err(|err| {
            AssemblyError::remote(
                &dataset.path,
                format!(
                    "failed moving {} -> {}: {err}",
                    temp_target.display(),
                    target.display()
                ),
            )
        })?;
        info!(
            "[codeswitch:hf] download complete {}: {:.1} MiB in {:.1}s",
            target.display(),
            total_bytes as f64 / (1024.0 * 1024.0),
            started.elapsed().as_secs_f64()
        );
        Ok(target)
    }
}

impl DatasetHub for HuggingFaceHub {
    fn id(&self) -> &str {
        "huggingface"
    }

    fn fetch_rows(
        &self,
        dataset: &DatasetRef,
        partition: &PartitionRef,
    ) -> Result<Vec<Value>, AssemblyError> {
        let listing = self.list_pinned_files(dataset)?;
        let selected = select_partition_files(&listing, partition, &self.config.shard_extensions);

        let mut paths = Vec::new();
        if selected.is_empty() {
            warn!(
                "[codeswitch:hf] no files for {}/{} at revision {} of {}; falling back to the parquet manifest (revision not pinned)",
                partition.config, partition.split, dataset.revision, dataset.path
            );
            let shards = self.manifest_shards(dataset, partition)?;
            if shards.is_empty() {
                return Err(AssemblyError::remote(
                    &dataset.path,
                    format!(
                        "no shard files for config '{}' split '{}'",
                        partition.config, partition.split
                    ),
                ));
            }
            for shard in &shards {
                paths.push(self.download_manifest_shard(dataset, shard)?);
            }
        } else {
            for file in &selected {
                debug!("[codeswitch:hf] fetching {file}");
                paths.push(self.fetch_pinned_file(dataset, file)?);
            }
        }

        let mut rows = Vec::new();
        for path in &paths {
            rows.extend(read_shard_rows(&dataset.path, path)?);
        }
        info!(
            "[codeswitch:hf] {} {}/{}: {} rows from {} shard(s)",
            dataset.path,
            partition.config,
            partition.split,
            rows.len(),
            paths.len()
        );
        Ok(rows)
    }
}

/// Extract manifest entries for `partition` with accepted extensions, sorted by URL.
fn parse_manifest(
    json: &Value,
    partition: &PartitionRef,
    shard_extensions: &[String],
) -> Vec<ManifestShard> {
    let accepted = normalized_extensions(shard_extensions);
    let mut shards = Vec::new();
    let Some(entries) = json.get("parquet_files").and_then(Value::as_array) else {
        return shards;
    };
    for entry in entries {
        let Some(url) = entry.get("url").and_then(Value::as_str) else {
            continue;
        };
        let field_matches = |field: &str, expected: &str| {
            entry
                .get(field)
                .and_then(Value::as_str)
                .is_none_or(|value| value == expected)
        };
        if !field_matches("config", &partition.config)
            || !field_matches("split", &partition.split)
        {
            continue;
        }
        let ext = Path::new(url)
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase());
        if !ext
            .as_deref()
            .is_some_and(|value| accepted.iter().any(|allowed| allowed == value))
        {
            continue;
        }
        shards.push(ManifestShard {
            url: url.to_string(),
            size: entry.get("size").and_then(Value::as_u64),
        });
    }
    shards.sort_by(|a, b| a.url.cmp(&b.url));
    shards
}
