//! Orchestrates planning, parallel readers and the aggregator.
//!
//! ```text
//!   plan_file ──► ChunkReader 0 ─┐
//!             ├─► ChunkReader 1 ─┼─► bounded queue ─► Aggregator ─► count
//!             └─► ChunkReader N ─┘
//! ```
//!
//! Readers report their own failures into a shared [`FirstError`], which
//! cancels the run. The orchestrator joins every reader, closes the queue and
//! then returns either the aggregator's count or the first error. Never both.

use std::path::Path;
use std::thread::{self, Builder};
use std::time::Instant;

use crossbeam_channel::bounded;

use crate::aggregator::Aggregator;
use crate::cancel::{CancelToken, FirstError};
use crate::chunk;
use crate::config::{Config, StoreKind};
use crate::error::{CountError, Result};
use crate::reader::{ChunkReader, ReaderStats};
use crate::store::{Bitmap, Bucket, ListBucket};

/// Counting pipeline for one configuration. Reusable across files.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Validate `config` and build a pipeline around it.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Count distinct addresses in `path` with the configured store.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        match self.config.store {
            StoreKind::List => self.run_with::<ListBucket>(path),
            StoreKind::Bitmap => self.run_with::<Bitmap>(path),
        }
    }

    /// Count distinct addresses in `path` using bucket type `B`.
    pub fn run_with<B: Bucket + 'static>(&self, path: &Path) -> Result<u64> {
        let started = Instant::now();
        let chunks = chunk::plan_file(path, self.config.chunks)?;
        log::info!(
            "Counting {:?}: {} chunks of {} bytes, queue capacity {}, {} store",
            path,
            chunks.len(),
            chunks.first().map_or(0, |c| c.byte_budget),
            self.config.queue_capacity,
            self.config.store
        );

        let cancel = CancelToken::new();
        let errors = FirstError::new(cancel.clone());
        let (tx, rx) = bounded::<u32>(self.config.queue_capacity);
        let lookback = self.config.lookback;

        let outcome = thread::scope(|scope| -> Result<(Result<u64>, ReaderStats)> {
            let errors = &errors;

            let aggregator = {
                let cancel = cancel.clone();
                Builder::new()
                    .name("ipcount-aggregator".into())
                    .spawn_scoped(scope, move || Aggregator::<B>::new(rx, cancel).run())
                    .map_err(|source| CountError::Spawn {
                        what: "aggregator",
                        source,
                    })?
            };

            let mut readers = Vec::with_capacity(chunks.len());
            for (index, chunk) in chunks.iter().copied().enumerate() {
                let reader = ChunkReader::new(index, path, chunk, tx.clone(), cancel.clone())
                    .with_lookback(lookback);
                let spawned = Builder::new()
                    .name(format!("ipcount-reader-{index}"))
                    .spawn_scoped(scope, move || match reader.run() {
                        Ok(stats) => Some(stats),
                        Err(err) => {
                            errors.report(err);
                            None
                        }
                    });
                match spawned {
                    Ok(handle) => readers.push(handle),
                    Err(source) => {
                        errors.report(CountError::Spawn {
                            what: "reader",
                            source,
                        });
                        break;
                    }
                }
            }
            // The queue closes once the last reader drops its sender.
            drop(tx);

            let mut totals = ReaderStats::default();
            for handle in readers {
                match handle.join() {
                    Ok(Some(stats)) => {
                        totals.lines += stats.lines;
                        totals.blank_lines += stats.blank_lines;
                        totals.addresses += stats.addresses;
                        totals.bytes += stats.bytes;
                    }
                    Ok(None) => {}
                    Err(_) => {
                        errors.report(CountError::WorkerPanicked("reader"));
                    }
                }
            }

            let count = aggregator
                .join()
                .unwrap_or(Err(CountError::WorkerPanicked("aggregator")));
            Ok((count, totals))
        });

        if let Some(err) = errors.take() {
            log::warn!("Run aborted after {:.2?}: {}", started.elapsed(), err);
            return Err(err);
        }
        let (count, totals) = outcome?;
        let count = count?;
        log::info!(
            "Read {} lines ({} blank, {} addresses, {} bytes); {} distinct in {:.2?}",
            totals.lines,
            totals.blank_lines,
            totals.addresses,
            totals.bytes,
            count,
            started.elapsed()
        );
        Ok(count)
    }
}
