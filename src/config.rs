//! Run configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::{CountError, Result};

/// Longest dotted-quad line: `255.255.255.255\n`.
pub const MAX_ADDRESS_LINE: usize = 16;

/// Which bucket representation the aggregator's store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    /// Per-bucket address lists: small resident table, linear membership scan.
    List,
    /// Dense 256-bit bitmaps: constant-time membership, 512 MiB table.
    #[default]
    Bitmap,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreKind::List => "list",
            StoreKind::Bitmap => "bitmap",
        })
    }
}

impl FromStr for StoreKind {
    type Err = CountError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "list" => Ok(StoreKind::List),
            "bitmap" => Ok(StoreKind::Bitmap),
            other => Err(CountError::InvalidConfig(format!(
                "unknown store kind '{other}' (expected 'list' or 'bitmap')"
            ))),
        }
    }
}

/// Configuration for a counting run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of byte-range chunks read in parallel (one thread each).
    pub chunks: usize,
    /// Capacity of the bounded address queue between readers and aggregator.
    pub queue_capacity: usize,
    /// Bucket representation for the deduplication store.
    pub store: StoreKind,
    /// Initial backward window when a reader looks for the previous line
    /// break. Doubles until a break or the start of the file is found.
    pub lookback: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunks: 32,
            queue_capacity: 4096,
            store: StoreKind::default(),
            lookback: MAX_ADDRESS_LINE,
        }
    }
}

impl Config {
    pub fn with_chunks(mut self, chunks: usize) -> Self {
        self.chunks = chunks;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunks == 0 {
            return Err(CountError::InvalidConfig(
                "chunk count must be at least 1".into(),
            ));
        }
        if self.queue_capacity == 0 {
            return Err(CountError::InvalidConfig(
                "queue capacity must be at least 1".into(),
            ));
        }
        if self.lookback == 0 {
            return Err(CountError::InvalidConfig(
                "lookback window must be at least 1 byte".into(),
            ));
        }
        Ok(())
    }
}
