//! Generate a file of random IPv4 addresses.
//!
//! cargo run --release --features gen --example generate -- --file ips.txt --max-size-mb 100

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use ipcount::gen::write_random_addresses;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

#[derive(Parser)]
#[command(name = "generate", about = "Generate a file with random IPv4 addresses")]
#[command(group(ArgGroup::new("size").required(true).args(["max_size_kb", "max_size_mb", "max_size_gb"])))]
struct Args {
    /// Name of the generated file
    #[arg(short, long)]
    file: PathBuf,

    /// Maximum size of the generated file in KB
    #[arg(long)]
    max_size_kb: Option<u64>,

    /// Maximum size of the generated file in MB
    #[arg(long)]
    max_size_mb: Option<u64>,

    /// Maximum size of the generated file in GB
    #[arg(long)]
    max_size_gb: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let max_bytes = match (args.max_size_kb, args.max_size_mb, args.max_size_gb) {
        (Some(kb), _, _) => kb * KB,
        (_, Some(mb), _) => mb * MB,
        (_, _, Some(gb)) => gb * GB,
        _ => bail!("max size not specified"),
    };
    if max_bytes == 0 {
        bail!("max size must be positive");
    }

    let file = File::create(&args.file).with_context(|| format!("creating {}", args.file.display()))?;
    let mut out = BufWriter::new(file);
    let lines = write_random_addresses(&mut out, max_bytes, &mut rand::thread_rng())?;
    out.flush()?;
    println!("wrote {} addresses to {}", lines, args.file.display());
    Ok(())
}
