//! Random input generator for benchmarks and manual testing.

use std::io::{self, Write};
use std::net::Ipv4Addr;

use rand::Rng;

use crate::config::MAX_ADDRESS_LINE;

/// Write `max_bytes / 16` random dotted-quad lines to `out`.
///
/// Every line is at most 16 bytes, so the output never exceeds `max_bytes`.
/// Returns the number of lines written.
pub fn write_random_addresses<W: Write, R: Rng + ?Sized>(
    out: &mut W,
    max_bytes: u64,
    rng: &mut R,
) -> io::Result<u64> {
    let lines = max_bytes / MAX_ADDRESS_LINE as u64;
    for _ in 0..lines {
        writeln!(out, "{}", Ipv4Addr::from(rng.gen::<u32>()))?;
    }
    Ok(lines)
}
