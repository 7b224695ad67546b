//! Corpus precompute CLI.
//!
//! Reads every master-list YAML file in the input directory, consults the
//! manifest already published in the output directory, and rebuilds the
//! corpus artifacts only when a source checksum changed (or `--force`).

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use taxon_engine::pipeline::store::{ArtifactStore, DirStore};
use taxon_engine::{BuildOutcome, PipelineConfig, PrecomputePipeline};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "precompute", about = "Build the species alias corpus")]
struct Args {
    /// Directory containing master-list YAML files.
    #[arg(long)]
    master: PathBuf,

    /// Directory the corpus, lightweight export, and manifest are published
    /// to.
    #[arg(long)]
    out: PathBuf,

    /// Rebuild even when source checksums match the manifest.
    #[arg(long)]
    force: bool,

    /// Character n-gram order.
    #[arg(long, default_value_t = 3)]
    ngram_q: u8,

    /// MinHash signature width.
    #[arg(long, default_value_t = 64)]
    minhash_k: u16,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let sources = read_sources(&args.master)?;
    anyhow::ensure!(
        !sources.is_empty(),
        "no .yaml master-list files in {}",
        args.master.display()
    );

    let store = DirStore::new(&args.out);
    let previous = store.load_manifest()?;

    let pipeline = PrecomputePipeline::new(PipelineConfig {
        ngram_q: args.ngram_q,
        minhash_k: args.minhash_k,
        ..PipelineConfig::default()
    });

    match pipeline.run(&sources, previous.as_ref(), args.force)? {
        BuildOutcome::UpToDate => {
            info!("skipped, up to date");
        }
        BuildOutcome::Rebuilt(artifacts) => {
            store.publish(&artifacts)?;
            info!(
                aliases = artifacts.corpus.records.len(),
                out = %args.out.display(),
                "corpus published"
            );
        }
    }
    Ok(())
}

/// Collect `(relative path, bytes)` for every YAML file, sorted by path so
/// row diagnostics and checksums are stable.
fn read_sources(dir: &PathBuf) -> Result<Vec<(String, Vec<u8>)>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if !is_yaml {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        sources.push((name, bytes));
    }
    sources.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(sources)
}
