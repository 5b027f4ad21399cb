//! Error type for the counting pipeline.
//!
//! Library code returns [`CountError`]; the binary wraps it in `anyhow` for
//! context at the command-line boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Every way a count can fail.
///
/// At most one of these is surfaced per run: the first fatal error reported by
/// any reader wins and the rest are dropped.
#[derive(Error, Debug)]
pub enum CountError {
    /// The input could not be stat'd, opened, positioned or read.
    #[error("I/O error during {operation} on '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank line is not a dotted-quad IPv4 address.
    #[error("invalid IPv4 at byte {offset}: {line:?}")]
    Parse { line: String, offset: u64 },

    /// The run was aborted because another worker failed first.
    #[error("cancelled")]
    Cancelled,

    /// Rejected configuration (zero chunks, zero queue capacity, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to start a worker thread.
    #[error("failed to spawn {what} thread: {source}")]
    Spawn {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked instead of returning.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

impl CountError {
    pub(crate) fn file_access(
        path: impl Into<PathBuf>,
        operation: &'static str,
        source: std::io::Error,
    ) -> Self {
        Self::FileAccess {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Whether this is the internal unwinding signal rather than a real failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, CountError>;
