//! Dense 256-bit bucket.

use std::fmt;

use super::{low_key, Bucket};

const WORDS: usize = 4;

/// 256-bit membership field for one bucket.
///
/// Bit `b` is set when an address with low byte `b` has been inserted. The
/// word is `b >> 6` and the bit within it is `b & 63`.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
#[repr(transparent)]
pub struct Bitmap([u64; WORDS]);

impl Bitmap {
    pub const EMPTY: Bitmap = Bitmap([0; WORDS]);

    pub const fn from_words(words: [u64; WORDS]) -> Self {
        Self(words)
    }

    pub const fn words(self) -> [u64; WORDS] {
        self.0
    }

    /// Single-bit mask selecting `low_byte`.
    #[inline]
    pub const fn for_low_byte(low_byte: u8) -> Self {
        let mut words = [0u64; WORDS];
        words[(low_byte >> 6) as usize] = 1u64 << (low_byte & 63);
        Self(words)
    }

    /// Element-wise AND with `mask`.
    #[inline]
    pub fn apply(self, mask: Bitmap) -> Bitmap {
        Bitmap([
            self.0[0] & mask.0[0],
            self.0[1] & mask.0[1],
            self.0[2] & mask.0[2],
            self.0[3] & mask.0[3],
        ])
    }

    /// True iff every bit set in `mask` is also set here.
    #[inline]
    pub fn has(self, mask: Bitmap) -> bool {
        self.apply(mask) == mask
    }

    /// Set every bit of `mask`.
    #[inline]
    pub fn merge(&mut self, mask: Bitmap) {
        for (word, bits) in self.0.iter_mut().zip(mask.0) {
            *word |= bits;
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == [0; WORDS]
    }
}

// SAFETY: `Bitmap` is a transparent `[u64; 4]`; all-zero is the empty field.
unsafe impl Bucket for Bitmap {
    #[inline]
    fn insert(&mut self, address: u32) -> bool {
        let mask = Self::for_low_byte(low_key(address));
        if self.has(mask) {
            return false;
        }
        self.merge(mask);
        true
    }

    #[inline]
    fn contains(&self, address: u32) -> bool {
        self.has(Self::for_low_byte(low_key(address)))
    }

    fn cardinality(&self) -> u32 {
        self.0.iter().map(|w| w.count_ones()).sum()
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({self})")
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:#018x} {:#018x} {:#018x} {:#018x}]",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let bm = Bitmap::from_words([0, 0, 0, 1]);
        assert_eq!(bm.apply(Bitmap::from_words([1, 0, 0, 0])), Bitmap::EMPTY);

        let bm = Bitmap::from_words([1, 1, 1, 1]);
        let mask = Bitmap::from_words([1 << 63 | 1, 1 << 63, 1, 0]);
        assert_eq!(bm.apply(mask).words(), [1, 0, 1, 0]);

        let bm = Bitmap::from_words([1, 0, 0, 0]);
        assert_eq!(bm.apply(bm), bm);
    }

    #[test]
    fn test_has() {
        let mask = Bitmap::from_words([1, 0, 0, 0]);
        assert!(!Bitmap::EMPTY.has(mask));
        assert!(Bitmap::from_words([1, 0, 0, 0]).has(mask));
        assert!(Bitmap::from_words([u64::MAX; 4]).has(Bitmap::from_words([0, 0, 1, 0])));

        // Multi-bit masks need every bit present.
        let partial = Bitmap::from_words([0b01, 0, 0, 0]);
        assert!(!partial.has(Bitmap::from_words([0b11, 0, 0, 0])));
        assert!(Bitmap::EMPTY.has(Bitmap::EMPTY));
    }

    #[test]
    fn test_for_low_byte() {
        let cases: [(u32, [u64; 4]); 7] = [
            (0, [1, 0, 0, 0]),
            (0xff_ff_ff_00, [1, 0, 0, 0]),
            (u32::MAX, [0, 0, 0, 1 << 63]),
            (1, [2, 0, 0, 0]),
            (0x80, [0, 0, 1, 0]),
            (0xff, [0, 0, 0, 1 << 63]),
            (0xc0, [0, 0, 0, 1]),
        ];
        for (address, words) in cases {
            assert_eq!(
                Bitmap::for_low_byte(low_key(address)).words(),
                words,
                "address {address:#x}"
            );
        }
    }

    #[test]
    fn test_insert_and_cardinality() {
        let mut bm = Bitmap::EMPTY;
        assert!(bm.is_empty());
        for low in 0..=255u32 {
            assert!(bm.insert(0x0a0b_0c00 | low));
            assert!(!bm.insert(0x0a0b_0c00 | low));
        }
        assert_eq!(bm.cardinality(), 256);
        assert_eq!(bm.words(), [u64::MAX; 4]);
    }

    #[test]
    fn test_merge() {
        let mut bm = Bitmap::for_low_byte(3);
        bm.merge(Bitmap::for_low_byte(200));
        assert!(bm.contains(3));
        assert!(bm.contains(200));
        assert!(!bm.contains(4));
        assert_eq!(bm.cardinality(), 2);
    }
}
