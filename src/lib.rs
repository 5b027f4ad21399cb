//! # ipcount
//!
//! Count distinct IPv4 addresses in a large newline-delimited text file.
//!
//! The file is split into byte ranges that are read in parallel, each reader
//! on its own handle and never splitting a line. Parsed addresses flow through
//! one bounded queue into a single aggregator that owns a two-level
//! deduplication store: `2^24` buckets indexed by the top 24 bits, each
//! tracking the low 8 bits either as a list or as a 256-bit bitmap.
//!
//! ## Example
//!
//! ```no_run
//! use ipcount::{Config, Pipeline, StoreKind};
//!
//! let config = Config::default().with_chunks(16).with_store(StoreKind::Bitmap);
//! let distinct = Pipeline::new(config)?.run("ips.txt")?;
//! println!("found {distinct} unique IP addresses");
//! # Ok::<(), ipcount::CountError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod aggregator;
pub mod baseline;
pub mod cancel;
pub mod chunk;
pub mod config;
pub mod error;
#[cfg(feature = "gen")]
pub mod gen;
pub mod logging;
pub mod pipeline;
pub mod reader;
pub mod store;

pub use config::{Config, StoreKind};
pub use error::{CountError, Result};
pub use pipeline::Pipeline;
pub use store::{BitmapStore, DedupStore, ListStore};

use std::path::Path;

/// Count distinct addresses in `path` with `chunk_count` parallel readers and
/// a queue of `queue_capacity` addresses, using the default store.
pub fn run(path: impl AsRef<Path>, chunk_count: usize, queue_capacity: usize) -> Result<u64> {
    let config = Config::default()
        .with_chunks(chunk_count)
        .with_queue_capacity(queue_capacity);
    count_unique(path, &config)
}

/// Count distinct addresses in `path` with an explicit configuration.
pub fn count_unique(path: impl AsRef<Path>, config: &Config) -> Result<u64> {
    Pipeline::new(config.clone())?.run(path)
}

#[cfg(test)]
mod proptests;
