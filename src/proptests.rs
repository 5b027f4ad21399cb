use super::*;

use std::collections::BTreeSet;
use std::io::Write;

use proptest::prelude::*;

use crate::store::{bucket_index, low_key, Bitmap, Bucket};

fn validate_store<B: Bucket>(store: &DedupStore<B>, expected: &BTreeSet<u32>) {
    assert_eq!(store.count(), expected.len() as u64, "count must track distinct inserts");

    let mut per_bucket: std::collections::BTreeMap<usize, u32> = Default::default();
    for &a in expected {
        assert!(store.contains(a), "inserted address {a:#x} missing");
        *per_bucket.entry(bucket_index(a)).or_default() += 1;
    }
    for (index, n) in per_bucket {
        assert_eq!(store.bucket(index).cardinality(), n, "bucket {index:#x}");
    }
}

/// Addresses clustered into a handful of buckets so collisions are common.
fn address_strategy() -> impl Strategy<Value = u32> + Clone {
    prop_oneof![
        3 => (0u32..8, any::<u8>()).prop_map(|(hi, lo)| (hi << 8) | lo as u32),
        1 => any::<u32>(),
    ]
}

fn lines_strategy() -> impl Strategy<Value = Vec<Option<u32>>> {
    // `None` is a blank line.
    prop::collection::vec(
        prop_oneof![9 => address_strategy().prop_map(Some), 1 => Just(None)],
        0..=300,
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        max_shrink_iters: 2_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_store_equivalence(addresses in prop::collection::vec(address_strategy(), 0..=2000)) {
        let mut list = ListStore::new();
        let mut bitmap = BitmapStore::new();
        let mut oracle = BTreeSet::new();

        for a in addresses {
            let fresh = oracle.insert(a);
            prop_assert_eq!(list.insert(a), fresh);
            prop_assert_eq!(bitmap.insert(a), fresh);
            prop_assert_eq!(list.count(), bitmap.count());
        }

        validate_store(&list, &oracle);
        validate_store(&bitmap, &oracle);
    }

    #[test]
    fn prop_bitmap_mask_single_bit(low in any::<u8>()) {
        let mask = Bitmap::for_low_byte(low);
        let words = mask.words();
        prop_assert_eq!(words.iter().map(|w| w.count_ones()).sum::<u32>(), 1);
        prop_assert_eq!(words[(low >> 6) as usize], 1u64 << (low & 63));

        let mut bm = Bitmap::EMPTY;
        prop_assert!(bm.insert(low as u32));
        prop_assert!(bm.has(mask));
        prop_assert_eq!(bm.apply(mask), mask);
    }

    #[test]
    fn prop_count_independent_of_chunking(
        lines in lines_strategy(),
        chunks in 1usize..=12,
        capacity in 1usize..=8,
        crlf in any::<bool>(),
        trailing_newline in any::<bool>(),
    ) {
        let eol = if crlf { "\r\n" } else { "\n" };
        let mut contents = String::new();
        for (i, line) in lines.iter().enumerate() {
            if let Some(a) = line {
                contents.push_str(&std::net::Ipv4Addr::from(*a).to_string());
            }
            if i + 1 < lines.len() || trailing_newline {
                contents.push_str(eol);
            }
        }
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();

        let expected = lines.iter().flatten().collect::<BTreeSet<_>>().len() as u64;
        let config = Config::default()
            .with_chunks(chunks)
            .with_queue_capacity(capacity)
            .with_store(StoreKind::List);
        let got = count_unique(file.path(), &config).unwrap();
        prop_assert_eq!(got, expected);

        let single = count_unique(file.path(), &config.clone().with_chunks(1)).unwrap();
        prop_assert_eq!(single, got);
    }
}

#[test]
fn exhaustive_low_keys_one_bucket() {
    let mut bitmap = BitmapStore::new();
    let mut list = ListStore::new();
    let base = 0xc0a8_0100u32;
    for low in (0..=255u32).rev() {
        assert!(bitmap.insert(base | low));
        assert!(list.insert(base | low));
    }
    let index = bucket_index(base);
    assert_eq!(bitmap.bucket(index).words(), [u64::MAX; 4]);
    assert_eq!(list.bucket(index).cardinality(), 256);
    assert_eq!(low_key(list.bucket(index).addresses()[0]), 255);
    assert_eq!(bitmap.count(), 256);
    assert_eq!(list.count(), 256);
    assert_eq!(bitmap.bucket(index + 1).cardinality(), 0);
}
