//! Exact-membership store over 32-bit addresses.
//!
//! The address space is split in two levels:
//!
//! 1. **Bucket**: the top 24 bits (`address >> 8`) index a flat array of
//!    `2^24` buckets, allocated eagerly when the store is built.
//! 2. **Low key**: the low 8 bits (`address & 0xff`) are tracked inside the
//!    bucket by one of the [`Bucket`] implementations.
//!
//! Two bucket types are provided:
//!
//! - [`ListBucket`]: the addresses seen so far, appended in insertion order and
//!   scanned linearly. Payload is only allocated on the first insert, so the
//!   eager array costs 8 bytes per bucket (128 MiB).
//! - [`Bitmap`]: a dense 256-bit field. Constant-time insert and lookup at a
//!   fixed cost of 32 bytes per bucket (512 MiB) regardless of how sparse the
//!   input is.
//!
//! The store has no internal synchronisation. The pipeline funnels every
//! insert through a single aggregator thread.

mod bitmap;
mod list;

pub use bitmap::Bitmap;
pub use list::ListBucket;

use std::alloc::{self, Layout};

/// Number of buckets: one per distinct top-24-bit prefix.
pub const BUCKETS: usize = 1 << 24;

/// Bucket index for an address (its top 24 bits).
#[inline]
pub fn bucket_index(address: u32) -> usize {
    (address >> 8) as usize
}

/// Position of an address inside its bucket (its low 8 bits).
#[inline]
pub fn low_key(address: u32) -> u8 {
    (address & 0xff) as u8
}

/// Membership state for the 256 addresses sharing one 24-bit prefix.
///
/// # Safety
///
/// The all-zero bit pattern must be a valid, empty bucket. The store allocates
/// its bucket array with [`std::alloc::alloc_zeroed`] and never runs a
/// constructor per bucket.
pub unsafe trait Bucket: Send {
    /// Record `address`. Returns `true` if it was not already present.
    fn insert(&mut self, address: u32) -> bool;

    /// Whether `address` has been recorded.
    fn contains(&self, address: u32) -> bool;

    /// Number of distinct addresses recorded in this bucket.
    fn cardinality(&self) -> u32;
}

/// Deduplicating store for 32-bit addresses, generic over the bucket type.
///
/// ```
/// use ipcount::store::BitmapStore;
///
/// let mut store = BitmapStore::new();
/// assert!(store.insert(0x0a00_0001));
/// assert!(!store.insert(0x0a00_0001));
/// assert!(store.contains(0x0a00_0001));
/// assert_eq!(store.count(), 1);
/// ```
pub struct DedupStore<B: Bucket> {
    buckets: Box<[B]>,
    count: u64,
}

/// Store backed by lazily allocated address lists.
pub type ListStore = DedupStore<ListBucket>;

/// Store backed by dense 256-bit bitmaps.
pub type BitmapStore = DedupStore<Bitmap>;

impl<B: Bucket> DedupStore<B> {
    /// Allocate the full bucket array. Nothing is shared between stores.
    pub fn new() -> Self {
        Self {
            buckets: zeroed_buckets::<B>(BUCKETS),
            count: 0,
        }
    }

    /// Insert an address. Returns `true` if this changed membership.
    #[inline]
    pub fn insert(&mut self, address: u32) -> bool {
        let inserted = self.buckets[bucket_index(address)].insert(address);
        if inserted {
            self.count += 1;
        }
        inserted
    }

    #[inline]
    pub fn contains(&self, address: u32) -> bool {
        self.buckets[bucket_index(address)].contains(address)
    }

    /// Number of distinct addresses inserted so far.
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The bucket at `index` (`address >> 8`).
    ///
    /// # Panics
    ///
    /// Panics if `index >= BUCKETS`.
    pub fn bucket(&self, index: usize) -> &B {
        &self.buckets[index]
    }

    /// Bytes held by the eager bucket array (excluding lazily allocated payload).
    pub fn table_bytes(&self) -> usize {
        std::mem::size_of_val(&*self.buckets)
    }
}

impl<B: Bucket> Default for DedupStore<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Bucket> Extend<u32> for DedupStore<B> {
    fn extend<I: IntoIterator<Item = u32>>(&mut self, iter: I) {
        for address in iter {
            self.insert(address);
        }
    }
}

/// Allocate `len` buckets as one zeroed block.
///
/// Zeroed pages are handed out lazily by the OS, so an untouched region of the
/// table costs address space but no resident memory.
fn zeroed_buckets<B: Bucket>(len: usize) -> Box<[B]> {
    assert!(
        len > 0 && std::mem::size_of::<B>() != 0,
        "bucket table must have a non-zero size"
    );
    let layout = match Layout::array::<B>(len) {
        Ok(layout) => layout,
        Err(_) => panic!("bucket table of {len} entries overflows the address space"),
    };
    // SAFETY: layout has non-zero size (asserted above).
    let ptr = unsafe { alloc::alloc_zeroed(layout) }.cast::<B>();
    if ptr.is_null() {
        alloc::handle_alloc_error(layout);
    }
    // SAFETY: `ptr` was allocated by the global allocator with the layout of
    // `[B; len]`, and `Bucket` guarantees all-zero is a valid `B`.
    unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)) }
}
