//! Single consumer that folds the address queue into one store.

use crossbeam_channel::{select, Receiver};

use crate::cancel::CancelToken;
use crate::error::{CountError, Result};
use crate::store::{Bucket, DedupStore};

/// Drains the address queue into a [`DedupStore`] it owns.
///
/// The aggregator is the only writer of its store, so the store needs no
/// locking.
pub struct Aggregator<B: Bucket> {
    store: DedupStore<B>,
    addresses: Receiver<u32>,
    cancel: CancelToken,
}

impl<B: Bucket> Aggregator<B> {
    /// Build with a freshly allocated store.
    pub fn new(addresses: Receiver<u32>, cancel: CancelToken) -> Self {
        Self::with_store(DedupStore::new(), addresses, cancel)
    }

    pub fn with_store(store: DedupStore<B>, addresses: Receiver<u32>, cancel: CancelToken) -> Self {
        Self {
            store,
            addresses,
            cancel,
        }
    }

    /// Consume until every sender is gone, then return the distinct count.
    ///
    /// Returns [`CountError::Cancelled`] if the token fires first.
    pub fn run(mut self) -> Result<u64> {
        loop {
            select! {
                recv(self.addresses) -> msg => match msg {
                    Ok(address) => {
                        self.store.insert(address);
                    }
                    Err(_) => return Ok(self.store.count()),
                },
                recv(self.cancel.signal()) -> _ => return Err(CountError::Cancelled),
            }
        }
    }
}
