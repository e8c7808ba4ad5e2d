use core::hash::Hash;
use core::hash::Hasher;
use core::hint::black_box;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::BenchmarkGroup;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::measurement::WallTime;
use group_hash::HashTable as GroupHashTable;
use hashbrown::hash_table::Entry as HashbrownEntry;
use hashbrown::hash_table::HashTable as HashbrownHashTable;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

trait KeyValuePair: Clone {
    fn new(key: u64) -> Self;

    fn hash_key(&self) -> u64;
    fn eq_key(&self, other: &Self) -> bool;
}

#[derive(Clone)]
struct StringItem {
    key: String,
    _value: u64,
}

impl KeyValuePair for StringItem {
    fn new(key: u64) -> Self {
        black_box(Self {
            key: format!("key_{key:016X}"),
            _value: key,
        })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

#[derive(Clone)]
struct U64Item {
    key: u64,
}

impl KeyValuePair for U64Item {
    fn new(key: u64) -> Self {
        black_box(Self { key })
    }

    fn hash_key(&self) -> u64 {
        let mut hasher = SipHasher::new();
        self.key.hash(&mut hasher);
        hasher.finish()
    }

    fn eq_key(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

/// The operations every contender runs, so each benchmark body is written once.
trait BenchTable<T: KeyValuePair>: Sized {
    const NAME: &'static str;

    fn with_capacity(capacity: usize) -> Self;
    fn capacity(&self) -> usize;
    fn reserve(&mut self, additional: usize);
    /// Inserts `item`, or removes the existing equal item. Returns whether
    /// the item was inserted.
    fn insert_or_remove(&mut self, hash: u64, item: T) -> bool;
    fn upsert(&mut self, hash: u64, item: T);
    fn find(&self, hash: u64, item: &T) -> Option<&T>;
    fn remove(&mut self, hash: u64, item: &T) -> Option<T>;
    fn count(&self) -> usize;
}

impl<T: KeyValuePair> BenchTable<T> for GroupHashTable<T> {
    const NAME: &'static str = "group_hash";

    fn with_capacity(capacity: usize) -> Self {
        GroupHashTable::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        GroupHashTable::capacity(self)
    }

    fn reserve(&mut self, additional: usize) {
        GroupHashTable::reserve(self, additional, |v| v.hash_key());
    }

    fn insert_or_remove(&mut self, hash: u64, item: T) -> bool {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            group_hash::hash_table::Entry::Vacant(entry) => {
                black_box(entry.insert(item));
                true
            }
            group_hash::hash_table::Entry::Occupied(entry) => {
                black_box(entry.remove());
                false
            }
        }
    }

    fn upsert(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            group_hash::hash_table::Entry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            group_hash::hash_table::Entry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }

    fn find(&self, hash: u64, item: &T) -> Option<&T> {
        GroupHashTable::find(self, hash, |v| v.eq_key(item))
    }

    fn remove(&mut self, hash: u64, item: &T) -> Option<T> {
        GroupHashTable::remove(self, hash, |v| v.eq_key(item))
    }

    fn count(&self) -> usize {
        self.iter().count()
    }
}

impl<T: KeyValuePair> BenchTable<T> for HashbrownHashTable<T> {
    const NAME: &'static str = "hashbrown";

    fn with_capacity(capacity: usize) -> Self {
        HashbrownHashTable::with_capacity(capacity)
    }

    fn capacity(&self) -> usize {
        HashbrownHashTable::capacity(self)
    }

    fn reserve(&mut self, additional: usize) {
        HashbrownHashTable::reserve(self, additional, |v| v.hash_key());
    }

    fn insert_or_remove(&mut self, hash: u64, item: T) -> bool {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                black_box(entry.insert(item));
                true
            }
            HashbrownEntry::Occupied(entry) => {
                black_box(entry.remove().0);
                false
            }
        }
    }

    fn upsert(&mut self, hash: u64, item: T) {
        match self.entry(hash, |v| v.eq_key(&item), |v| v.hash_key()) {
            HashbrownEntry::Vacant(entry) => {
                black_box(entry.insert(item));
            }
            HashbrownEntry::Occupied(mut entry) => {
                *entry.get_mut() = item;
            }
        }
    }

    fn find(&self, hash: u64, item: &T) -> Option<&T> {
        HashbrownHashTable::find(self, hash, |v| v.eq_key(item))
    }

    fn remove(&mut self, hash: u64, item: &T) -> Option<T> {
        self.find_entry(hash, |v| v.eq_key(item))
            .ok()
            .map(|entry| entry.remove().0)
    }

    fn count(&self) -> usize {
        self.iter().count()
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

fn make_group(c: &mut Criterion, name: &str) -> BenchmarkGroup<'_, WallTime> {
    let mut group = c.benchmark_group(name);
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));
    group
}

fn random_items<T: KeyValuePair>(count: usize) -> Vec<(u64, T)> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| {
            let key = rng.try_next_u64().unwrap();
            let item = T::new(key);
            (item.hash_key(), item)
        })
        .collect()
}

fn sequential_items<T: KeyValuePair>(keys: impl Iterator<Item = u64>) -> Vec<(u64, T)> {
    keys.map(|key| {
        let item = T::new(key);
        (item.hash_key(), item)
    })
    .collect()
}

fn shuffled<X: Clone>(items: &[X]) -> Vec<X> {
    let mut items = items.to_vec();
    items.shuffle(&mut SmallRng::from_os_rng());
    items
}

fn insert_random<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
    preallocate: bool,
) {
    let capacity = Table::with_capacity(size).capacity();
    let items = random_items::<T>(capacity);

    group.throughput(Throughput::Elements(capacity as u64));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter_batched(
            || shuffled(&items),
            |items| {
                let mut table = Table::with_capacity(0);
                if preallocate {
                    table.reserve(capacity);
                }
                for (hash, item) in items {
                    black_box(table.insert_or_remove(hash, item));
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_random<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    for preallocate in [false, true] {
        let mut group = make_group(
            c,
            &format!(
                "insert_random{}_{}",
                if preallocate { "_preallocated" } else { "" },
                core::any::type_name::<T>()
            ),
        );
        for &size in &SIZES[..=MAX_SIZE] {
            insert_random::<T, GroupHashTable<T>>(&mut group, size, preallocate);
            insert_random::<T, HashbrownHashTable<T>>(&mut group, size, preallocate);
        }
        group.finish();
    }
}

/// Looks up a shuffled mix of present (even) and absent (odd) keys.
fn find_hit_miss<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
) {
    let mut table = Table::with_capacity(size);
    let capacity = table.capacity();
    let present = sequential_items::<T>((0..capacity as u64).map(|k| k * 2));
    for (hash, item) in present.iter().cloned() {
        table.insert_or_remove(hash, item);
    }
    let probes = sequential_items::<T>(0..capacity as u64 * 2);

    group.throughput(Throughput::Elements(probes.len() as u64));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter_batched(
            || shuffled(&probes),
            |probes| {
                for (hash, item) in &probes {
                    black_box(table.find(*hash, item));
                }
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_find_hit_miss<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = make_group(
        c,
        &format!("find_hit_miss_{}", core::any::type_name::<T>()),
    );
    for &size in &SIZES[..=MAX_SIZE] {
        find_hit_miss::<T, GroupHashTable<T>>(&mut group, size);
        find_hit_miss::<T, HashbrownHashTable<T>>(&mut group, size);
    }
    group.finish();
}

fn remove_all<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
) {
    let capacity = Table::with_capacity(size).capacity();
    let items = sequential_items::<T>(0..capacity as u64);

    group.throughput(Throughput::Elements(capacity as u64));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter_batched(
            || {
                let mut table = Table::with_capacity(size);
                for (hash, item) in items.iter().cloned() {
                    table.insert_or_remove(hash, item);
                }
                (table, shuffled(&items))
            },
            |(mut table, items)| {
                for (hash, item) in &items {
                    black_box(table.remove(*hash, item));
                }
                black_box(table)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_remove<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = make_group(c, &format!("remove_{}", core::any::type_name::<T>()));
    for &size in &SIZES[..=MAX_SIZE] {
        remove_all::<T, GroupHashTable<T>>(&mut group, size);
        remove_all::<T, HashbrownHashTable<T>>(&mut group, size);
    }
    group.finish();
}

fn iterate<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
) {
    let mut table = Table::with_capacity(size);
    let capacity = table.capacity();
    for (hash, item) in random_items::<T>(capacity / 2) {
        table.insert_or_remove(hash, item);
    }

    group.throughput(Throughput::Elements(capacity as u64 / 2));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter(|| black_box(table.count()))
    });
}

fn bench_iteration<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = make_group(c, &format!("iteration_{}", core::any::type_name::<T>()));
    for &size in &SIZES[..=MAX_SIZE] {
        iterate::<T, GroupHashTable<T>>(&mut group, size);
        iterate::<T, HashbrownHashTable<T>>(&mut group, size);
    }
    group.finish();
}

/// Every key appears twice in a shuffled stream; the first sighting inserts,
/// the second removes. Exercises tombstone reuse and same-size rebuilds.
fn churn<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
) {
    let capacity = Table::with_capacity(size).capacity();
    let stream = sequential_items::<T>(0..capacity as u64)
        .into_iter()
        .flat_map(|pair| [pair.clone(), pair])
        .collect::<Vec<_>>();

    group.throughput(Throughput::Elements(stream.len() as u64));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter_batched(
            || shuffled(&stream),
            |stream| {
                let mut table = Table::with_capacity(0);
                for (hash, item) in stream {
                    black_box(table.insert_or_remove(hash, item));
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_churn<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = make_group(c, &format!("churn_{}", core::any::type_name::<T>()));
    for &size in &SIZES[..=MAX_SIZE] {
        churn::<T, GroupHashTable<T>>(&mut group, size);
        churn::<T, HashbrownHashTable<T>>(&mut group, size);
    }
    group.finish();
}

#[derive(Clone, Copy)]
enum Operation {
    Insert,
    Remove,
    Find,
}

/// Zipf-skewed keys and a Zipf-skewed operation mix that favours lookups.
fn mixed_zipf<T: KeyValuePair, Table: BenchTable<T>>(
    group: &mut BenchmarkGroup<'_, WallTime>,
    size: usize,
    exponent: f64,
) {
    const KEY_SPACE_MULTIPLIER: f32 = 2.0;

    let capacity = Table::with_capacity(size).capacity();
    let mut rng = SmallRng::from_os_rng();

    let op_distr = Zipf::new(3.0, exponent).unwrap();
    let operations = (0..capacity * 3)
        .map(|_| {
            let op_choice: f64 = rng.sample(op_distr);
            if op_choice <= 1.0 {
                Operation::Find
            } else if op_choice <= 2.0 {
                Operation::Insert
            } else {
                Operation::Remove
            }
        })
        .collect::<Vec<Operation>>();

    let insert_distr = Zipf::new(capacity as f32 - 1.0, 1.0).unwrap();
    let lookup_distr = Zipf::new(capacity as f32 * KEY_SPACE_MULTIPLIER - 1.0, 1.0).unwrap();

    group.throughput(Throughput::Elements(operations.len() as u64));
    group.bench_function(format!("{}/{size}", Table::NAME), |b| {
        b.iter_batched(
            || shuffled(&operations),
            |operations| {
                let mut table = Table::with_capacity(0);
                for operation in operations {
                    match operation {
                        Operation::Insert => {
                            let item = T::new(rng.sample(insert_distr) as u64);
                            table.upsert(item.hash_key(), item);
                        }
                        Operation::Remove => {
                            let item = T::new(rng.sample(lookup_distr) as u64);
                            black_box(table.remove(item.hash_key(), &item));
                        }
                        Operation::Find => {
                            let item = T::new(rng.sample(lookup_distr) as u64);
                            black_box(table.find(item.hash_key(), &item));
                        }
                    }
                }
                black_box(table)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_mixed_zipf<T: KeyValuePair, const MAX_SIZE: usize>(c: &mut Criterion) {
    for exponent in [1.0, 1.3] {
        let mut group = make_group(
            c,
            &format!(
                "mixed_zipf_{exponent:.01}_{}",
                core::any::type_name::<T>()
            ),
        );
        for &size in &SIZES[..=MAX_SIZE] {
            mixed_zipf::<T, GroupHashTable<T>>(&mut group, size, exponent);
            mixed_zipf::<T, HashbrownHashTable<T>>(&mut group, size, exponent);
        }
        group.finish();
    }
}

criterion_group!(
    benches,
    bench_insert_random::<U64Item, 4>,
    bench_insert_random::<StringItem, 4>,
    bench_find_hit_miss::<U64Item, 4>,
    bench_find_hit_miss::<StringItem, 4>,
    bench_remove::<U64Item, 4>,
    bench_remove::<StringItem, 4>,
    bench_iteration::<U64Item, 4>,
    bench_iteration::<StringItem, 4>,
    bench_churn::<U64Item, 4>,
    bench_churn::<StringItem, 4>,
    bench_mixed_zipf::<U64Item, 4>,
    bench_mixed_zipf::<StringItem, 3>,
);

criterion_main!(benches);
