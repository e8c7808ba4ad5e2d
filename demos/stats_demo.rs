use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use group_hash::HashTable;
use group_hash::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Percentage of the inserted values to remove again before reporting.
    #[arg(short = 'r', long = "remove_percent", default_value_t = 0)]
    remove_percent: u8,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating HashTable with target capacity: {}",
        args.target_capacity
    );

    let mut table: HashTable<u64> = HashTable::with_capacity(args.target_capacity);
    let allocated = table.buckets();

    println!(
        "Actual capacity: {} ({} buckets)",
        table.capacity(),
        table.buckets()
    );
    println!("Filling table with u64 values...");

    let num_values = table.capacity() as u64;
    for value in 0..num_values {
        match table.entry(hash_u64(value), |&v| v == value, |&v| hash_u64(v)) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {value}");
            }
        }
    }

    let to_remove = num_values * u64::from(args.remove_percent.min(100)) / 100;
    for value in 0..to_remove {
        table.remove(hash_u64(value), |&v| v == value);
    }

    println!("Inserted {num_values} values, removed {to_remove}");
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.buckets() as f64) * 100.0
    );
    assert_eq!(table.buckets(), allocated, "filling to capacity must not grow");

    table.probe_histogram(|&v| hash_u64(v)).print();
    table.debug_stats().print();
}
