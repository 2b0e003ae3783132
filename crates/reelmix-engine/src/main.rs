//! ReelMix command-line binary.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use reelmix_engine::{
    init_tracing, ClipIngestor, ClipRegistry, EngineConfig, ExportPipeline, FsPayloadStore,
    Generation, SequenceGenerator, ZipArchiveWriter,
};
use reelmix_media::FfmpegMediaService;
use reelmix_models::ClipRole;

#[derive(Debug, Parser)]
#[command(name = "reelmix", version, about = "Assemble short-form videos from classified clips")]
struct Cli {
    /// Seed for reproducible sequence generation
    #[arg(long, global = true, env = "REELMIX_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate sequences from a clip directory and print them
    Plan {
        /// Directory of hook / selling point / cta clips
        dir: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Generate sequences and export them
    Export {
        /// Directory of hook / selling point / cta clips
        dir: PathBuf,
        /// Archive (or single video with --single) to write
        #[arg(short, long)]
        output: PathBuf,
        /// Export only the first sequence as one video
        #[arg(long)]
        single: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = EngineConfig::from_env()?;
    info!("Engine config: {:?}", config);

    let media = Arc::new(
        FfmpegMediaService::new().with_timeout(config.export.ffmpeg_timeout_secs),
    );

    // Rewrapped clips live as long as the ingestor
    let ingestor = ClipIngestor::new(media.clone(), config.ingest.clone());

    match cli.command {
        Command::Plan { dir, json } => {
            let generation = plan(&dir, &config, &ingestor, cli.seed).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&generation.sequences)?);
            } else {
                print_table(&generation);
            }
        }
        Command::Export { dir, output, single } => {
            let generation = plan(&dir, &config, &ingestor, cli.seed).await?;
            let pipeline = ExportPipeline::new(
                media,
                Arc::new(FsPayloadStore::new()),
                Arc::new(ZipArchiveWriter::new()),
                config.export.clone(),
            );

            if single {
                let first = generation
                    .sequences
                    .first()
                    .context("no sequence was generated")?;
                let artifact = pipeline.export_one(first).await?;
                write_output(&output, &artifact.bytes).await?;
                info!(output = %output.display(), name = %artifact.name, "Video written");
            } else {
                let archive = pipeline.export_all(&generation.sequences).await?;
                write_output(&output, &archive).await?;
                info!(
                    output = %output.display(),
                    videos = generation.len(),
                    "Archive written"
                );
            }
        }
    }

    if let Err(e) = ingestor.close().await {
        warn!("Failed to remove rewrapped clips: {}", e);
    }
    Ok(())
}

async fn plan(
    dir: &Path,
    config: &EngineConfig,
    ingestor: &ClipIngestor,
    seed: Option<u64>,
) -> Result<Generation> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut registry = ClipRegistry::new();
    for clip in ingestor
        .ingest_dir(dir)
        .await
        .with_context(|| format!("failed to ingest {}", dir.display()))?
    {
        registry.add(clip);
    }

    info!(
        hooks = registry.count_by_role(ClipRole::Hook),
        selling_points = registry.count_by_role(ClipRole::SellingPoint),
        ctas = registry.count_by_role(ClipRole::Cta),
        "Clips registered"
    );

    let generator = SequenceGenerator::new(config.generator.clone());
    let clips = registry.snapshot();
    let generation = match seed {
        Some(seed) => generator.generate_with_rng(&clips, &mut StdRng::seed_from_u64(seed))?,
        None => generator.generate(&clips)?,
    };

    if generation.is_partial() {
        warn!(
            "Only {} of {} sequences could be generated",
            generation.len(),
            generation.target
        );
    }
    Ok(generation)
}

fn print_table(generation: &Generation) {
    for sequence in &generation.sequences {
        let names: Vec<&str> = sequence.clips.iter().map(|c| c.name.as_str()).collect();
        println!(
            "#{:<3} {:>7.2}s  {}",
            sequence.id.get(),
            sequence.duration,
            names.join(" + ")
        );
    }
    println!(
        "{} sequence(s), {} distinct combination(s) possible",
        generation.len(),
        generation.ceiling
    );
}

async fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))
}
