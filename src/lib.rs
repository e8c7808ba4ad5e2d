#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod allocator;
mod control;
mod error;
mod group;
mod probe;

/// A `HashMap` built on the group-probed [`HashTable`].
///
/// This module provides a `HashMap` that wraps the `HashTable` and provides
/// a standard key-value map interface with configurable hashers.
pub mod hash_map;

pub mod hash_table;

/// A `HashSet` built on the group-probed [`HashTable`].
///
/// This module provides a `HashSet` that wraps the `HashTable` and provides
/// a standard set interface with configurable hashers.
pub mod hash_set;

#[cfg(all(test, feature = "std"))]
mod proptests;

pub use allocator::Allocator;
pub use allocator::Global;
pub use error::AllocError;
pub use error::TryReserveError;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_set::HashSet;
#[cfg(feature = "stats")]
pub use hash_table::DebugStats;
pub use hash_table::HashTable;
#[cfg(feature = "stats")]
pub use hash_table::ProbeHistogram;

/// The hasher builder used by the examples in this crate's documentation.
#[cfg(feature = "foldhash")]
pub type DefaultHashBuilder = foldhash::fast::RandomState;
