//! Run-wide cancellation and first-error reporting.
//!
//! [`CancelToken`] is both a flag (cheap to poll once per line) and a channel
//! that becomes ready when the token fires, so a thread blocked in
//! `crossbeam_channel::select!` wakes up as soon as the run is aborted.
//!
//! [`FirstError`] never blocks a reporter: the first error is kept, later ones
//! are dropped, and every report fires the token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::CountError;

struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancel, disconnecting `signal`.
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

/// Shared cancellation handle. Clones observe the same state.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.trigger.lock().take();
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Receiver that never yields a message and disconnects once cancelled.
    ///
    /// Use it as a `recv` arm in `select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the first fatal error reported by any worker.
pub struct FirstError {
    slot: Mutex<Option<CountError>>,
    cancel: CancelToken,
}

impl FirstError {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            slot: Mutex::new(None),
            cancel,
        }
    }

    /// Record `err` if nothing was recorded yet and cancel the run.
    ///
    /// Returns `true` if this was the first report. [`CountError::Cancelled`]
    /// is an unwinding signal, not a failure, and is ignored.
    pub fn report(&self, err: CountError) -> bool {
        if err.is_cancelled() {
            return false;
        }
        let first = {
            let mut slot = self.slot.lock();
            if slot.is_none() {
                *slot = Some(err);
                true
            } else {
                false
            }
        };
        self.cancel.cancel();
        first
    }

    pub fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn take(&self) -> Option<CountError> {
        self.slot.lock().take()
    }
}
