use anyhow::{Context, Result};
use clap::Parser;
use eyewire_tiles::config::{DEFAULT_DATA_URL, DEFAULT_TASK_URL};
use eyewire_tiles::{
    ChunkOffset, ChunkOutcome, HttpTileApi, Pipeline, PipelineConfig, PlaceholderKey, Slicing,
    TaskAssignment,
};
use eyewire_tiles_output::html_out::layout_to_html;
use eyewire_tiles_output::zip_out::layout_to_zip;
use eyewire_tiles_output::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Task assignment endpoint (POST)
    #[arg(long, default_value = DEFAULT_TASK_URL)]
    task_url: String,

    /// Base URL of the volume tile service
    #[arg(long, default_value = DEFAULT_DATA_URL)]
    data_url: String,

    /// Slicing plane of the requested tiles: xy, xz or zy
    #[arg(long, default_value_t = Slicing::Xy)]
    slicing: Slicing,

    /// Read the task assignment from a JSON file instead of requesting one
    #[arg(long)]
    task: Option<PathBuf>,

    /// Write the filled layout to an HTML page
    #[arg(long)]
    html: Option<PathBuf>,

    /// Write the received tiles to a zip of PNG files
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Log request details
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if args.html.is_none() && args.zip.is_none() {
        println!("--html or --zip must be supplied to save the tiles. Fetching only.");
    }

    let config = PipelineConfig {
        task_url: args.task_url,
        data_url: args.data_url,
        slicing: args.slicing,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(HttpTileApi::new(config));

    let pb = ProgressBar::new(ChunkOffset::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({msg})")?
            .progress_chars("#>-"),
    );
    let on_chunk = |offset: ChunkOffset, outcome: &ChunkOutcome| {
        pb.set_message(format!("chunk {}", offset));
        if !outcome.is_applied() {
            pb.println(format!("Chunk {} skipped", offset));
        }
        pb.inc(1);
    };

    let output = match &args.task {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("Failed to read task file: {}", path.display()))?;
            let task: TaskAssignment = serde_json::from_slice(&data)
                .with_context(|| format!("Failed to parse task file: {}", path.display()))?;
            pipeline.run_task(task, on_chunk).await
        }
        None => pipeline.run_with_callback(on_chunk).await,
    }
    .context("Pipeline halted")?;
    pb.finish_with_message("done");

    println!(
        "Volume {}: {}/{} chunks, {}/{} placeholders filled",
        output.task.channel_id,
        output.report.applied_count(),
        ChunkOffset::ALL.len(),
        output.layout.filled_count(),
        output.layout.placeholder_count()
    );
    for (offset, err) in output.report.failed() {
        println!("  chunk {}: {}", offset, err);
    }

    if let Some(path) = &args.html {
        layout_to_html(&output.layout, &output.task, &path.to_string_lossy())?;
    }
    if let Some(path) = &args.zip {
        let zip_pb = ProgressBar::new(output.layout.filled_count() as u64);
        let count = layout_to_zip(
            &output.layout,
            &path.to_string_lossy(),
            Some(|_key: PlaceholderKey, _img: &DynamicImage| zip_pb.inc(1)),
        )?;
        zip_pb.finish_and_clear();
        println!("Wrote {} tiles to {}", count, path.display());
    }

    Ok(())
}
