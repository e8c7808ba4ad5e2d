use std::collections::HashMap as StdHashMap;
use std::hash::BuildHasher;
use std::hash::Hasher;
use std::vec::Vec;

use proptest::prelude::*;
use siphasher::sip::SipHasher;

use crate::HashMap;
use crate::allocator::counting::CountingAllocator;
use crate::hash_table::tests::validate;

/// Keyed SipHash with fixed keys so failures replay deterministically.
#[derive(Clone, Default)]
struct FixedSip;

impl BuildHasher for FixedSip {
    type Hasher = SipHasher;

    fn build_hasher(&self) -> Self::Hasher {
        SipHasher::new_with_keys(0x0123_4567_89ab_cdef, 0xfedc_ba98_7654_3210)
    }
}

/// Sends every key to one of a handful of hashes, so groups overflow and
/// tombstones pile up.
#[derive(Clone, Default)]
struct Clustered;

#[derive(Default)]
struct ClusteredHasher(u64);

impl Hasher for ClusteredHasher {
    fn finish(&self) -> u64 {
        (self.0 % 5) << 7
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.wrapping_mul(31).wrapping_add(u64::from(b));
        }
    }
}

impl BuildHasher for Clustered {
    type Hasher = ClusteredHasher;

    fn build_hasher(&self) -> Self::Hasher {
        ClusteredHasher::default()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
    EntryAdd(u16, u32),
    Reserve(usize),
    ShrinkToFit,
    Clear,
    ClearShrink,
}

fn ops_strategy(keys: u16) -> impl Strategy<Value = Vec<Op>> {
    let key = 0..keys;
    let op = prop_oneof![
        40 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        20 => key.clone().prop_map(Op::Get),
        10 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::EntryAdd(k, v)),
        2 => (0usize..64).prop_map(Op::Reserve),
        1 => Just(Op::ShrinkToFit),
        1 => Just(Op::Clear),
        1 => Just(Op::ClearShrink),
    ];
    prop::collection::vec(op, 0..=1500)
}

/// Smallest capacity a shrunk table may report for `len` elements.
fn minimal_capacity(len: usize) -> usize {
    match len {
        0 => 0,
        1..=3 => 3,
        4..=7 => 7,
        _ => (len * 8 / 7).next_power_of_two() / 8 * 7,
    }
}

fn run_model<S: BuildHasher>(map: &mut HashMap<u16, u32, S>, ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut model: StdHashMap<u16, u32> = StdHashMap::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                prop_assert_eq!(map.insert(k, v), model.insert(k, v));
            }
            Op::Remove(k) => {
                prop_assert_eq!(map.remove(&k), model.remove(&k));
            }
            Op::Get(k) => {
                prop_assert_eq!(map.get(&k), model.get(&k));
            }
            Op::EntryAdd(k, v) => {
                let got = *map
                    .entry(k)
                    .and_modify(|e| *e = e.wrapping_add(v))
                    .or_insert(v);
                let expected = *model
                    .entry(k)
                    .and_modify(|e| *e = e.wrapping_add(v))
                    .or_insert(v);
                prop_assert_eq!(got, expected);
            }
            Op::Reserve(additional) => {
                let before = map.capacity();
                map.reserve(additional);
                prop_assert!(map.capacity() >= map.len() + additional);
                if map.len() + additional <= before {
                    prop_assert_eq!(map.capacity(), before);
                }
            }
            Op::ShrinkToFit => {
                map.shrink_to_fit();
                prop_assert_eq!(map.capacity(), minimal_capacity(map.len()));
            }
            Op::Clear => {
                let before = map.capacity();
                map.clear();
                model.clear();
                prop_assert_eq!(map.capacity(), before);
            }
            Op::ClearShrink => {
                map.clear_shrink();
                model.clear();
                prop_assert_eq!(map.capacity(), 0);
            }
        }

        prop_assert_eq!(map.len(), model.len());
        prop_assert!(map.capacity() >= map.len());
    }

    let hasher = map.hasher();
    validate(map.raw_table(), |(k, _)| hasher.hash_one(k));

    let mut got: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let mut expected: Vec<(u16, u32)> = model.into_iter().collect();
    got.sort_unstable();
    expected.sort_unstable();
    prop_assert_eq!(got, expected);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 20_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_matches_std_map(ops in ops_strategy(512)) {
        let mut map = HashMap::with_hasher(FixedSip);
        run_model(&mut map, ops)?;
    }

    #[test]
    fn prop_matches_std_map_dense_keys(ops in ops_strategy(24)) {
        let mut map = HashMap::with_hasher(FixedSip);
        run_model(&mut map, ops)?;
    }

    #[test]
    fn prop_matches_std_map_clustered_hashes(ops in ops_strategy(96)) {
        let mut map = HashMap::with_hasher(Clustered);
        run_model(&mut map, ops)?;
    }

    #[test]
    fn prop_reserve_then_fill_allocates_once(n in 1usize..2000) {
        let alloc = CountingAllocator::default();
        let mut map = HashMap::with_hasher_in(FixedSip, alloc.clone());

        map.reserve(n);
        prop_assert_eq!(alloc.allocations(), 1);
        for i in 0..n {
            map.insert(i, i);
        }
        prop_assert_eq!(alloc.allocations(), 1);
        prop_assert_eq!(alloc.frees(), 0);

        drop(map);
        prop_assert_eq!(alloc.frees(), 1);
        prop_assert_eq!(alloc.live_bytes(), 0);
    }

    #[test]
    fn prop_equality_ignores_insertion_order(keys in prop::collection::vec(any::<u16>(), 0..300)) {
        let forward: HashMap<u16, u16, FixedSip> = keys.iter().map(|&k| (k, k)).collect();
        let mut backward = HashMap::with_capacity_and_hasher(keys.len() * 2, FixedSip);
        for &k in keys.iter().rev() {
            backward.insert(k, k);
        }
        prop_assert_eq!(forward, backward);
    }
}
