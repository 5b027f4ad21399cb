//! Single-threaded reference counters.
//!
//! Slower than the pipeline, but simple enough to trust. Used by the CLI's
//! `--strategy` flag, by tests as an oracle, and by the benchmarks.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use memmap2::Mmap;

use crate::error::{CountError, Result};
use crate::reader::{parse_address, trim_line};

/// Default number of appended addresses between sort+dedup passes (32 Mi).
pub const DEFAULT_DEDUP_THRESHOLD: usize = 32 * 1024 * 1024;

/// Count distinct non-blank lines as raw text, without parsing them.
///
/// `1.2.3.4` and `1.2.3.4\r` count as the same line; nothing else is
/// normalised.
pub fn count_naive(path: &Path) -> Result<u64> {
    let file = File::open(path).map_err(|e| CountError::file_access(path, "open", e))?;
    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    for line in BufReader::with_capacity(1 << 16, file).split(b'\n') {
        let line = line.map_err(|e| CountError::file_access(path, "read", e))?;
        let text = trim_line(&line);
        if !text.is_empty() && !seen.contains(text) {
            seen.insert(text.to_vec());
        }
    }
    Ok(seen.len() as u64)
}

/// Parse every line into a vector, compacting it with sort+dedup every
/// `dedup_threshold` appended addresses, then count what is left.
pub fn count_sorted(path: &Path, dedup_threshold: usize) -> Result<u64> {
    if dedup_threshold == 0 {
        return Err(CountError::InvalidConfig(
            "dedup threshold must be at least 1".into(),
        ));
    }
    let file = File::open(path).map_err(|e| CountError::file_access(path, "open", e))?;
    let len = file
        .metadata()
        .map_err(|e| CountError::file_access(path, "stat", e))?
        .len();
    if len == 0 {
        return Ok(0);
    }
    // SAFETY: read-only mapping of a file we only read; the input must not be
    // truncated while it is being counted.
    let map = unsafe { Mmap::map(&file) }.map_err(|e| CountError::file_access(path, "mmap", e))?;

    let mut addresses: Vec<u32> = Vec::new();
    let mut since_dedup = 0usize;
    let mut offset = 0u64;
    for line in map.split_inclusive(|&b| b == b'\n') {
        let line_offset = offset;
        offset += line.len() as u64;
        let text = trim_line(line);
        if text.is_empty() {
            continue;
        }
        let address = parse_address(text).ok_or_else(|| CountError::Parse {
            line: String::from_utf8_lossy(text).into_owned(),
            offset: line_offset,
        })?;
        addresses.push(address);
        since_dedup += 1;
        if since_dedup >= dedup_threshold {
            compact(&mut addresses);
            since_dedup = 0;
        }
    }
    compact(&mut addresses);
    Ok(addresses.len() as u64)
}

fn compact(addresses: &mut Vec<u32>) {
    addresses.sort_unstable();
    addresses.dedup();
}
