//! Splitting a file into byte ranges for parallel readers.

use std::fs;
use std::path::Path;

use crate::error::{CountError, Result};

/// Byte range handed to one reader.
///
/// `start_offset` is nominal: the reader moves it back to the start of the
/// line it falls in and grows `byte_budget` by the same amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileChunk {
    pub start_offset: u64,
    pub byte_budget: u64,
    /// The final chunk reads until end-of-file instead of stopping at its budget.
    pub last: bool,
}

impl FileChunk {
    /// Exclusive nominal end, or `None` for the final chunk.
    pub fn end_offset(&self) -> Option<u64> {
        if self.last {
            None
        } else {
            Some(self.start_offset + self.byte_budget)
        }
    }
}

/// Split `file_size` bytes into `chunks` ranges of `file_size / chunks` bytes.
///
/// The remainder is not assigned explicitly: the last chunk is marked `last`
/// and reads to end-of-file. `chunks` must be at least 1.
pub fn plan(file_size: u64, chunks: usize) -> Vec<FileChunk> {
    debug_assert!(chunks >= 1);
    let n = chunks.max(1) as u64;
    let size = file_size / n;
    (0..n)
        .map(|i| FileChunk {
            start_offset: i * size,
            byte_budget: size,
            last: i == n - 1,
        })
        .collect()
}

/// Stat `path` and plan `chunks` ranges over it.
pub fn plan_file(path: &Path, chunks: usize) -> Result<Vec<FileChunk>> {
    let meta = fs::metadata(path).map_err(|e| CountError::file_access(path, "stat", e))?;
    Ok(plan(meta.len(), chunks))
}
