//! Linear-scan bucket holding full addresses.

use smallvec::SmallVec;

use super::Bucket;

/// Addresses stored inline before spilling to the heap.
const INLINE: usize = 4;

/// Bucket that remembers each inserted address in insertion order.
///
/// Membership is a linear scan, so the worst case is 256 comparisons for a
/// full bucket. Nothing is allocated until the first insert.
#[derive(Default)]
#[repr(transparent)]
pub struct ListBucket(Option<Box<SmallVec<[u32; INLINE]>>>);

impl ListBucket {
    /// Addresses in insertion order.
    pub fn addresses(&self) -> &[u32] {
        match &self.0 {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }
}

// SAFETY: `Option<Box<_>>` is guaranteed to use the null pointer for `None`,
// so an all-zero `ListBucket` is the empty bucket.
unsafe impl Bucket for ListBucket {
    fn insert(&mut self, address: u32) -> bool {
        let list = self.0.get_or_insert_with(Default::default);
        if list.contains(&address) {
            return false;
        }
        list.push(address);
        true
    }

    fn contains(&self, address: u32) -> bool {
        self.addresses().contains(&address)
    }

    fn cardinality(&self) -> u32 {
        self.addresses().len() as u32
    }
}
