use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};
use tracing::info;

use crate::config::ParsePolicy;
use crate::export::export_task;
use crate::hub::{DatasetHub, SnapshotHub};
use crate::task::CodeSwitchingTask;
use crate::variants::{ALL_VARIANTS, find_variant};

#[derive(Debug, Parser)]
#[command(
    name = "codeswitch-assemble",
    version,
    disable_help_subcommand = true,
    about = "Assemble a code-switching retrieval dataset",
    long_about = "Merge a local code-switched query file with the pinned corpus and relevance judgments of a hub dataset, then print a summary or export it in BEIR layout.",
    after_help = "The query file is resolved in order by --query-file, then the task's environment variable (e.g. SCIDOCS_QUERY_FILE)."
)]
struct AssembleCli {
    #[arg(
        long,
        required_unless_present = "list_tasks",
        help = "Task key or name, e.g. scidocs or SCIDOCSCodeSwitching"
    )]
    task: Option<String>,
    #[arg(
        long = "query-file",
        value_name = "PATH",
        help = "Local JSONL file with one code-switched query per line"
    )]
    query_file: Option<PathBuf>,
    #[arg(
        long = "snapshot-dir",
        value_name = "DIR",
        help = "Read corpus and qrels from a local snapshot instead of the hub"
    )]
    snapshot_dir: Option<PathBuf>,
    #[arg(
        long = "cache-dir",
        value_name = "DIR",
        conflicts_with = "snapshot_dir",
        help = "Optional hub cache directory override"
    )]
    cache_dir: Option<PathBuf>,
    #[arg(long, help = "Skip malformed query lines instead of failing")]
    lenient: bool,
    #[arg(
        long = "export-dir",
        value_name = "DIR",
        help = "Write queries, corpus, qrels, and a manifest to this directory"
    )]
    export_dir: Option<PathBuf>,
    #[arg(long = "list-tasks", help = "Print registered tasks and exit")]
    list_tasks: bool,
}

/// Run the `codeswitch-assemble` command with `args_iter` (program name excluded).
pub fn run_assemble<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<AssembleCli, _>(
        std::iter::once("codeswitch-assemble".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    if cli.list_tasks {
        println!("Registered tasks:");
        for variant in ALL_VARIANTS {
            println!(
                "  {:<14} {:<30} {}@{} ({})",
                variant.key,
                variant.name,
                variant.dataset_path,
                &variant.revision[..8.min(variant.revision.len())],
                variant.query_file_env
            );
        }
        return Ok(());
    }

    let task_name = cli.task.as_deref().unwrap_or_default();
    let variant = find_variant(task_name)
        .ok_or_else(|| format!("unknown task '{task_name}'; use --list-tasks"))?;
    let hub = build_hub(cli.snapshot_dir, cli.cache_dir)?;
    let policy = if cli.lenient {
        ParsePolicy::Lenient
    } else {
        ParsePolicy::Strict
    };

    let mut task =
        CodeSwitchingTask::from_env(variant, cli.query_file, hub).with_parse_policy(policy);
    let split = task.eval_split();
    let stats = task.load_data()?.stats(split);

    println!("=== {} ===", task.name());
    println!("dataset        : {}@{}", variant.dataset_path, variant.revision);
    if let Some(path) = task.query_file() {
        println!("query file     : {}", path.display());
    }
    println!("split          : {split}");
    println!("queries        : {}", stats.queries);
    println!("documents      : {}", stats.documents);
    println!("judged queries : {}", stats.judged_queries);
    println!("judgments      : {}", stats.judgments);

    if let Some(out_dir) = cli.export_dir {
        let files = export_task(&task, &out_dir)?;
        println!("exported       : {}", out_dir.display());
        if let Some(manifest) = files.manifest {
            println!("manifest       : {}", manifest.display());
        }
    }
    Ok(())
}

fn build_hub(
    snapshot_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
) -> Result<Box<dyn DatasetHub>, Box<dyn Error>> {
    if let Some(root) = snapshot_dir {
        let hub = SnapshotHub::new(root);
        info!(
            "[codeswitch:cli] reading corpus and qrels from snapshot {}",
            hub.root().display()
        );
        return Ok(Box::new(hub));
    }
    remote_hub(cache_dir)
}

#[cfg(feature = "huggingface")]
fn remote_hub(cache_dir: Option<PathBuf>) -> Result<Box<dyn DatasetHub>, Box<dyn Error>> {
    use crate::constants::hub::HF_TOKEN_ENV;
    use crate::hub::{HubConfig, HuggingFaceHub};

    let token = std::env::var(HF_TOKEN_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());
    let config = HubConfig {
        cache_dir,
        token,
        ..HubConfig::default()
    };
    Ok(Box::new(HuggingFaceHub::new(config)?))
}

#[cfg(not(feature = "huggingface"))]
fn remote_hub(_cache_dir: Option<PathBuf>) -> Result<Box<dyn DatasetHub>, Box<dyn Error>> {
    Err("built without the `huggingface` feature; pass --snapshot-dir".into())
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
