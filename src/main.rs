//! WikiSlice: offset-indexed article extraction from multistream dumps
//!
//! Seeks directly to indexed bzip2 members of a multistream Wikipedia dump,
//! decompresses only those blocks, and emits the requested articles as
//! cleaned plain text.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wikislice::{
    config::{Config, LogFormat},
    extract::{Dispatcher, ExtractProgress, OffsetIndex, OutputSink},
};

#[derive(Parser)]
#[command(name = "wikislice")]
#[command(about = "Extract selected articles from a multistream Wikipedia dump")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "wikislice.toml")]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the indexed articles from the archive
    Extract {
        /// Offset index file (offset:pageId:title per line)
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Multistream dump archive (.xml.bz2)
        #[arg(short, long)]
        archive: Option<PathBuf>,

        /// Write all records to one line-delimited JSON file
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,

        /// Write one text file per article into this directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Worker pool size (0 = all available cores)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Quiet mode (no progress bar or summary)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show what an index file would schedule, without touching the archive
    Stats {
        /// Offset index file
        index: PathBuf,
    },

    /// Write a default wikislice.toml
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    // -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => config.logging.level.to_tracing(),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let builder = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false);
    match config.logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }

    match cli.command {
        Commands::Extract {
            index,
            archive,
            output,
            output_dir,
            workers,
            quiet,
        } => run_extract(config, index, archive, output, output_dir, workers, quiet),
        Commands::Stats { index } => show_stats(index),
        Commands::Init { path } => init_config(path),
    }
}

fn run_extract(
    config: Config,
    index: Option<PathBuf>,
    archive: Option<PathBuf>,
    output: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    workers: Option<usize>,
    quiet: bool,
) -> Result<()> {
    let index_path = index.unwrap_or_else(|| config.extract.index_file.clone());
    let archive_path = archive.unwrap_or_else(|| config.extract.archive_file.clone());

    if !archive_path.is_file() {
        anyhow::bail!("archive file not found: {}", archive_path.display());
    }

    let index = OffsetIndex::load(&index_path)?;
    info!(
        "loaded {} titles across {} blocks from {}",
        index.titles_requested(),
        index.block_count(),
        index_path.display()
    );

    // The sink is created after the configuration checks so a doomed run
    // never truncates a previous run's output
    let mut sink = if let Some(path) = output {
        info!("writing line-delimited JSON to {}", path.display());
        OutputSink::json_lines(&path)?
    } else if let Some(dir) = output_dir {
        info!("writing per-article files to {}", dir.display());
        OutputSink::per_file(&dir)?
    } else {
        anyhow::bail!("choose an output: --output <file> or --output-dir <dir>");
    };

    let progress = ExtractProgress::new(index.block_count(), index.titles_requested(), quiet);
    let dispatcher = Dispatcher::new(&archive_path)
        .with_workers(workers.unwrap_or(config.extract.workers))
        .with_chunk_bytes(config.extract.read_chunk_bytes);

    let stats = dispatcher.run(&index, &mut sink, &progress)?;
    sink.finish()?;

    if !quiet {
        progress.print_summary();
    }
    if stats.blocks_failed > 0 {
        info!(
            "{} blocks were skipped; rerun with -v for per-block details",
            stats.blocks_failed
        );
    }

    Ok(())
}

fn show_stats(index_path: PathBuf) -> Result<()> {
    let index = OffsetIndex::load(&index_path)?;

    println!("\nIndex Statistics");
    println!("================");
    println!("Index file:       {}", index_path.display());
    println!("Requested titles: {}", index.titles_requested());
    println!("Unique blocks:    {}", index.block_count());
    if index.block_count() > 0 {
        println!(
            "Titles per block: {:.1}",
            index.titles_requested() as f64 / index.block_count() as f64
        );
    }

    Ok(())
}

fn init_config(path: PathBuf) -> Result<()> {
    let config = Config::default();
    let config_path = path.join("wikislice.toml");

    let toml_content = format!(
        r#"# WikiSlice Configuration

[extract]
# Offset index file, one "offset:pageId:title" entry per line
index_file = "{}"
# Multistream dump archive
archive_file = "{}"
# Worker pool size (0 = all available cores)
workers = {}
# Compressed bytes read per chunk while inflating a block
read_chunk_bytes = {}

[logging]
format = "text"
level = "{}"
"#,
        config.extract.index_file.display(),
        config.extract.archive_file.display(),
        config.extract.workers,
        config.extract.read_chunk_bytes,
        config.logging.level,
    );

    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
