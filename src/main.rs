use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use ipcount::baseline::{self, DEFAULT_DEDUP_THRESHOLD};
use ipcount::logging::init_logger;
use ipcount::{Config, Pipeline, StoreKind};

#[derive(Parser)]
#[command(name = "ipcount")]
#[command(about = "Count distinct IPv4 addresses in a newline-delimited file", long_about = None)]
struct Cli {
    /// Input file, one dotted-quad per line
    #[arg(short, long)]
    file: PathBuf,

    /// Number of file chunks to process in parallel
    #[arg(short, long, default_value_t = 32)]
    chunks: usize,

    /// Capacity of the address queue between readers and the aggregator
    #[arg(short, long, default_value_t = 4096)]
    buffer: usize,

    /// Bucket representation for the dedup store (list or bitmap)
    #[arg(short, long, default_value_t = StoreKind::Bitmap)]
    store: StoreKind,

    /// Counting strategy
    #[arg(long, value_enum, default_value_t = Strategy::Pipeline)]
    strategy: Strategy,

    /// Sort+dedup threshold for the `sorted` strategy
    #[arg(long, default_value_t = DEFAULT_DEDUP_THRESHOLD)]
    dedup: usize,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Parallel chunk readers feeding a bucketed dedup store
    Pipeline,
    /// Set of raw line strings
    Naive,
    /// Sorted vector of parsed addresses
    Sorted,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let start = Instant::now();
    let unique = match cli.strategy {
        Strategy::Pipeline => {
            let config = Config::default()
                .with_chunks(cli.chunks)
                .with_queue_capacity(cli.buffer)
                .with_store(cli.store);
            Pipeline::new(config)?.run(&cli.file)
        }
        Strategy::Naive => baseline::count_naive(&cli.file),
        Strategy::Sorted => baseline::count_sorted(&cli.file, cli.dedup),
    }
    .with_context(|| format!("counting addresses in {}", cli.file.display()))?;

    println!(
        "found {} unique IP addresses in {}",
        unique,
        cli.file.display()
    );
    println!("took {:?}", start.elapsed());
    Ok(())
}
