//! Per-chunk line reader.
//!
//! Each [`ChunkReader`] opens the input on its own handle, moves its start back
//! to the beginning of the line containing the nominal offset, then parses
//! lines and pushes addresses onto the shared queue.
//!
//! A line belongs to the chunk whose nominal range holds its terminating
//! `\n` (for an unterminated final line, its last byte). Moving the start back
//! to the previous `\n` and stopping before any line whose `\n` lies at or past
//! the nominal end gives every line to exactly one reader.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::net::Ipv4Addr;
use std::path::Path;

use crossbeam_channel::{select, Sender, TrySendError};

use crate::cancel::CancelToken;
use crate::chunk::FileChunk;
use crate::config::MAX_ADDRESS_LINE;
use crate::error::{CountError, Result};

/// Buffer size for sequential line reads (64 KiB).
const READ_BUF_SIZE: usize = 64 * 1024;

/// Parse a dotted-quad (without line terminator) into its big-endian `u32`.
#[inline]
pub fn parse_address(text: &[u8]) -> Option<u32> {
    let text = std::str::from_utf8(text).ok()?;
    text.parse::<Ipv4Addr>().ok().map(u32::from)
}

/// Strip a trailing `\n` and an optional `\r` before it.
#[inline]
pub fn trim_line(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Offset of the first byte of the line containing `offset`.
///
/// Scans backward in windows of `window` bytes, doubling the window each time
/// no `\n` is found, until one is found or the start of the input is reached.
pub fn find_line_start<R: Read + Seek>(src: &mut R, offset: u64, window: usize) -> io::Result<u64> {
    if offset == 0 {
        return Ok(0);
    }
    let mut window = window.max(1) as u64;
    let mut end = offset;
    let mut buf = Vec::new();
    loop {
        let start = end.saturating_sub(window);
        buf.resize((end - start) as usize, 0);
        src.seek(SeekFrom::Start(start))?;
        src.read_exact(&mut buf)?;
        if let Some(pos) = buf.iter().rposition(|&b| b == b'\n') {
            return Ok(start + pos as u64 + 1);
        }
        if start == 0 {
            return Ok(0);
        }
        end = start;
        window = window.saturating_mul(2);
    }
}

/// What one reader did, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Offset the reader actually started from.
    pub start: u64,
    /// Bytes moved back from the nominal start.
    pub skipped: u64,
    /// Bytes consumed, terminators included.
    pub bytes: u64,
    pub lines: u64,
    pub blank_lines: u64,
    pub addresses: u64,
}

/// Reads one [`FileChunk`] and emits its addresses.
pub struct ChunkReader<'a> {
    index: usize,
    path: &'a Path,
    chunk: FileChunk,
    lookback: usize,
    addresses: Sender<u32>,
    cancel: CancelToken,
}

impl<'a> ChunkReader<'a> {
    pub fn new(
        index: usize,
        path: &'a Path,
        chunk: FileChunk,
        addresses: Sender<u32>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            index,
            path,
            chunk,
            lookback: MAX_ADDRESS_LINE,
            addresses,
            cancel,
        }
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    /// Read the chunk to completion.
    ///
    /// Returns [`CountError::Cancelled`] if the run was aborted elsewhere or
    /// the aggregator went away.
    pub fn run(self) -> Result<ReaderStats> {
        let path = self.path;
        let io_err =
            |operation: &'static str| move |e: io::Error| CountError::file_access(path, operation, e);

        let file = File::open(path).map_err(io_err("open"))?;
        let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);

        let start = find_line_start(reader.get_mut(), self.chunk.start_offset, self.lookback)
            .map_err(io_err("line boundary search"))?;
        let skipped = self.chunk.start_offset - start;
        let budget = self.chunk.end_offset().map(|end| end - start);
        reader.seek(SeekFrom::Start(start)).map_err(io_err("seek"))?;

        if skipped > 0 {
            log::debug!(
                "chunk {}: start moved back {} bytes to {}",
                self.index, skipped, start
            );
        }

        let mut stats = ReaderStats {
            start,
            skipped,
            ..ReaderStats::default()
        };
        let mut line = Vec::with_capacity(MAX_ADDRESS_LINE * 2);

        loop {
            if budget.is_some_and(|b| stats.bytes >= b) {
                break;
            }
            if self.cancel.is_cancelled() {
                return Err(CountError::Cancelled);
            }

            line.clear();
            let n = reader.read_until(b'\n', &mut line).map_err(io_err("read"))?;
            if n == 0 {
                break;
            }
            let line_end = stats.bytes + n as u64;
            // Terminator at or past the nominal end: the next chunk owns it.
            if budget.is_some_and(|b| line_end > b) {
                break;
            }
            // Unterminated tail that ends before the nominal start: the
            // previous chunk owns it.
            if line_end <= skipped {
                break;
            }

            let offset = start + stats.bytes;
            stats.bytes = line_end;
            stats.lines += 1;

            let text = trim_line(&line);
            if text.is_empty() {
                stats.blank_lines += 1;
                continue;
            }
            let address = parse_address(text).ok_or_else(|| CountError::Parse {
                line: String::from_utf8_lossy(text).into_owned(),
                offset,
            })?;
            self.emit(address)?;
            stats.addresses += 1;
        }

        log::debug!(
            "chunk {}: {} lines ({} blank), {} addresses, {} bytes from {}",
            self.index, stats.lines, stats.blank_lines, stats.addresses, stats.bytes, stats.start
        );
        Ok(stats)
    }

    /// Push onto the queue, blocking while it is full unless cancelled.
    #[inline]
    fn emit(&self, address: u32) -> Result<()> {
        match self.addresses.try_send(address) {
            Ok(()) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(CountError::Cancelled),
            Err(TrySendError::Full(address)) => select! {
                send(self.addresses, address) -> res => res.map_err(|_| CountError::Cancelled),
                recv(self.cancel.signal()) -> _ => Err(CountError::Cancelled),
            },
        }
    }
}
