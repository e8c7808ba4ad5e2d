//! The open-addressing table engine shared by [`HashMap`](crate::HashMap) and
//! [`HashSet`](crate::HashSet).
//!
//! Every slot has one control byte. Control bytes are scanned 16 at a time by
//! the group matcher, and keys are only compared against slots whose stored
//! 7-bit hash fragment matches. Groups are visited in triangular order, so a
//! probe reaches every group exactly once.
//!
//! The table works on pre-computed 64-bit hashes and caller-supplied equality
//! predicates. Operations that may move elements also take a `hasher`
//! closure so they can recompute an element's hash.

use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::NonNull;

use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::control;
use crate::control::Control;
use crate::control::DELETED;
use crate::control::EMPTY;
use crate::control::GROUP_WIDTH;
use crate::control::SENTINEL;
use crate::error::TryReserveError;
use crate::group::BitMask;
use crate::group::Group;
use crate::probe::ProbeSeq;

/// A power-of-two bucket count and the number of elements it may hold.
///
/// Tables below 8 buckets keep exactly one slot free; larger tables run at a
/// 7/8 load factor. Either way at least one `EMPTY` byte survives every
/// insertion, which is what terminates unsuccessful probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Capacity {
    buckets: usize,
}

impl Capacity {
    const MIN_BUCKETS: usize = 4;

    /// Smallest tier that holds `items` elements.
    fn for_items(items: usize) -> Option<Self> {
        debug_assert_ne!(items, 0);
        let buckets = if items < 4 {
            Self::MIN_BUCKETS
        } else if items < 8 {
            8
        } else {
            (items.checked_mul(8)? / 7).checked_next_power_of_two()?
        };
        Some(Capacity { buckets })
    }

    #[inline(always)]
    fn max_items(self) -> usize {
        if self.buckets < 8 {
            self.buckets - 1
        } else {
            self.buckets / 8 * 7
        }
    }

    /// Tables smaller than a group are scanned as one group padded with
    /// sentinel bytes.
    #[inline(always)]
    fn group_mask(self) -> usize {
        if self.buckets < GROUP_WIDTH {
            0
        } else {
            self.buckets / GROUP_WIDTH - 1
        }
    }
}

#[derive(Clone, Copy)]
enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("capacity overflow"),
        }
    }

    #[cold]
    fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}

#[inline]
fn infallible<T>(result: Result<T, TryReserveError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => unreachable!("infallible reservation returned an error: {err}"),
    }
}

/// Slots first, then `buckets + GROUP_WIDTH` control bytes.
#[derive(Debug, Clone, Copy)]
struct DataLayout {
    layout: Layout,
    ctrl_offset: usize,
}

impl DataLayout {
    fn new<V>(capacity: Capacity) -> Option<Self> {
        let slots_layout = Layout::array::<V>(capacity.buckets).ok()?;
        let ctrl_layout = Layout::array::<u8>(capacity.buckets.checked_add(GROUP_WIDTH)?).ok()?;
        let (layout, ctrl_offset) = slots_layout.extend(ctrl_layout).ok()?;

        Some(DataLayout {
            layout,
            ctrl_offset,
        })
    }
}

/// One live allocation: slot array plus control bytes.
///
/// Knows nothing about which slots hold values; the owning table tracks that.
/// Dropping a `RawStorage` does not free it, see [`RawStorage::free`].
struct RawStorage {
    base: NonNull<u8>,
    capacity: Capacity,
    layout: DataLayout,
}

impl RawStorage {
    fn allocate<V, A: Allocator>(
        alloc: &A,
        capacity: Capacity,
        fallibility: Fallibility,
    ) -> Result<Self, TryReserveError> {
        let layout =
            DataLayout::new::<V>(capacity).ok_or_else(|| fallibility.capacity_overflow())?;
        let base = alloc
            .allocate(layout.layout)
            .map_err(|_| fallibility.alloc_err(layout.layout))?;

        let storage = RawStorage {
            base,
            capacity,
            layout,
        };
        storage.reset_ctrl();
        // SAFETY: The control region holds `buckets + GROUP_WIDTH` bytes.
        unsafe {
            core::ptr::write_bytes(
                storage.ctrl().add(capacity.buckets),
                SENTINEL,
                GROUP_WIDTH,
            );
        }

        Ok(storage)
    }

    /// Return the memory to `alloc` without touching any slot contents.
    ///
    /// # Safety
    ///
    /// `alloc` must be the allocator (or a clone of it) that produced this
    /// storage.
    unsafe fn free<A: Allocator>(self, alloc: &A) {
        // SAFETY: Caller guarantees `alloc` produced `base` with this layout.
        unsafe { alloc.deallocate(self.base, self.layout.layout) }
    }

    #[inline(always)]
    fn buckets(&self) -> usize {
        self.capacity.buckets
    }

    #[inline(always)]
    fn ctrl(&self) -> *mut u8 {
        // SAFETY: `ctrl_offset` lies within the allocation.
        unsafe { self.base.as_ptr().add(self.layout.ctrl_offset) }
    }

    /// # Safety
    ///
    /// `index` must be less than `buckets()`.
    #[inline(always)]
    unsafe fn slot<V>(&self, index: usize) -> *mut V {
        debug_assert!(index < self.buckets());
        // SAFETY: Slots start at offset 0 and there are `buckets()` of them.
        unsafe { self.base.cast::<V>().as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than `buckets() + GROUP_WIDTH`.
    #[inline(always)]
    unsafe fn ctrl_byte(&self, index: usize) -> u8 {
        // SAFETY: Caller keeps `index` inside the control region.
        unsafe { *self.ctrl().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than `buckets()`.
    #[inline(always)]
    unsafe fn set_ctrl(&self, index: usize, byte: u8) {
        debug_assert!(index < self.buckets());
        // SAFETY: Caller keeps `index` inside the per-slot control bytes.
        unsafe { *self.ctrl().add(index) = byte }
    }

    /// # Safety
    ///
    /// `start` must be a group start returned by `group_start` or a
    /// multiple of `GROUP_WIDTH` below `buckets()`.
    #[inline(always)]
    unsafe fn group_at(&self, start: usize) -> Group {
        // SAFETY: Every group start is followed by at least `GROUP_WIDTH`
        // control bytes thanks to the guard bytes.
        unsafe { Group::load(self.ctrl().add(start)) }
    }

    #[inline(always)]
    fn group_start(&self, index: usize) -> usize {
        if self.buckets() < GROUP_WIDTH {
            0
        } else {
            index & !(GROUP_WIDTH - 1)
        }
    }

    fn reset_ctrl(&self) {
        // SAFETY: The first `buckets()` control bytes are in bounds.
        unsafe { core::ptr::write_bytes(self.ctrl(), EMPTY, self.buckets()) }
    }

    /// Probe for a slot whose value satisfies `eq`.
    ///
    /// # Safety
    ///
    /// Every `FULL` control byte must correspond to an initialized `V`.
    #[inline]
    unsafe fn find<V>(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        let fragment = control::fragment(hash);
        for group_index in ProbeSeq::new(hash, self.capacity.group_mask()) {
            let start = group_index * GROUP_WIDTH;
            // SAFETY: Group indices come from the probe sequence over this
            // table's group mask.
            let group = unsafe { self.group_at(start) };

            for bit in group.match_byte(fragment) {
                let index = start + bit;
                // SAFETY: Only per-slot bytes can hold a fragment, so `index`
                // is a live slot.
                if eq(unsafe { &*self.slot::<V>(index) }) {
                    return Some(index);
                }
            }

            if group.match_empty().any_bit_set() {
                return None;
            }
        }

        None
    }

    /// First `EMPTY` or `DELETED` slot on the probe sequence of `hash`.
    #[inline]
    fn find_insert_slot(&self, hash: u64) -> usize {
        for group_index in ProbeSeq::new(hash, self.capacity.group_mask()) {
            let start = group_index * GROUP_WIDTH;
            // SAFETY: See `find`.
            let group = unsafe { self.group_at(start) };
            if let Some(bit) = group.match_empty_or_deleted().lowest_set_bit() {
                return start + bit;
            }
        }

        unreachable!("hash table has no free slot")
    }

    fn raw_iter<V>(&self, items: usize) -> RawIter<V> {
        let current = if items == 0 {
            BitMask(0)
        } else {
            // SAFETY: Group 0 is always readable.
            unsafe { self.group_at(0) }.match_full()
        };

        RawIter {
            ctrl: self.ctrl(),
            slots: self.base.cast(),
            group_start: 0,
            current,
            remaining: items,
        }
    }
}

/// Whether the table owns storage.
///
/// A table in the `Empty` state answers every lookup with "absent" and every
/// iteration with nothing, without touching memory.
enum Storage {
    Empty,
    Allocated(RawStorage),
}

/// Frees freshly allocated storage if a rehash unwinds before completing.
struct StorageGuard<'a, A: Allocator> {
    storage: ManuallyDrop<RawStorage>,
    alloc: &'a A,
}

impl<A: Allocator> StorageGuard<'_, A> {
    fn into_inner(self) -> RawStorage {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the storage is taken exactly once.
        unsafe { ManuallyDrop::take(&mut this.storage) }
    }
}

impl<A: Allocator> Drop for StorageGuard<'_, A> {
    fn drop(&mut self) {
        // SAFETY: The guard holds the only handle to storage allocated from
        // `alloc`; values copied into it are still owned by the old storage.
        unsafe { ManuallyDrop::take(&mut self.storage).free(self.alloc) }
    }
}

/// Debug statistics for hash table analysis.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Maximum number of elements before a resize
    pub capacity: usize,
    /// Total number of slots allocated
    pub buckets: usize,
    /// Slots holding a tombstone
    pub tombstones: usize,
    /// Insertions into empty slots left before the next rehash
    pub growth_left: usize,
    /// Load factor (populated / capacity)
    pub load_factor: f64,
    /// Slot utilization (populated / buckets)
    pub slot_utilization: f64,
    /// Total memory in bytes used by the table
    pub total_bytes: usize,
    /// Bytes of slot storage not holding a value
    pub wasted_bytes: usize,
    /// Group matcher compiled into this build
    pub backend: &'static str,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ({}) ===", self.backend);
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Slot Usage: {}/{} ({:.2}% utilization, {} tombstones)",
            self.populated,
            self.buckets,
            self.slot_utilization * 100.0,
            self.tombstones
        );
        println!("Growth Left: {}", self.growth_left);
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

/// How many groups each element's lookup has to visit.
///
/// `counts()[n]` is the number of elements found in the `n`th group of their
/// probe sequence, so `counts()[0]` are the elements in their home group.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone, Default)]
pub struct ProbeHistogram {
    counts: alloc::vec::Vec<usize>,
}

#[cfg(any(test, feature = "stats"))]
impl ProbeHistogram {
    /// Element counts indexed by probe length.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Longest probe needed by any element, in groups.
    pub fn max_probe_length(&self) -> usize {
        self.counts.iter().rposition(|&c| c != 0).unwrap_or(0)
    }

    /// Mean number of extra groups visited per element.
    pub fn mean_probe_length(&self) -> f64 {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return 0.0;
        }
        let weighted: usize = self.counts.iter().enumerate().map(|(i, &c)| i * c).sum();
        weighted as f64 / total as f64
    }

    /// Print the histogram as a bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = *self.counts.iter().max().unwrap_or(&0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!(
            "probe histogram ({} entries):",
            self.counts.iter().sum::<usize>()
        );

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = match units % 8 {
                1 => Some('▏'),
                2 => Some('▎'),
                3 => Some('▍'),
                4 => Some('▌'),
                5 => Some('▋'),
                6 => Some('▊'),
                7 => Some('▉'),
                _ => None,
            };
            if let Some(ch) = partial {
                bar.push(ch);
            }
            bar
        };

        for (i, &count) in self.counts.iter().enumerate() {
            println!("{:>3} | {} ({})", i, make_bar(count), count);
        }
    }
}

/// An open-addressing hash table with 16-wide control groups.
///
/// `HashTable<V>` stores values of type `V`. Like other raw tables it does
/// not hash or compare on its own: lookups take a pre-computed hash and an
/// equality predicate, and operations that may move elements take a `hasher`
/// closure that recomputes an element's hash.
///
/// A new table does not allocate. Storage is acquired from the table's
/// [`Allocator`] on the first insertion or reservation, and grows through
/// power-of-two bucket counts.
///
/// ## Performance Characteristics
///
/// - **Memory**: 1 byte of control data per slot plus 16 guard bytes per
///   table; slots are sized to `V`, with no stored hash.
/// - **Load factor**: 7/8 for tables of 8 or more buckets, one free slot for
///   smaller tables.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use group_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # #[derive(Debug, PartialEq)]
/// # struct Person {
/// #     id: u64,
/// #     name: String,
/// # }
/// #
/// # fn hash_id(id: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     id.hash(&mut hasher);
/// #     hasher.finish()
/// # }
///
/// let mut table = HashTable::new();
/// let hasher = |p: &Person| hash_id(p.id);
///
/// match table.entry(hash_id(123), |p: &Person| p.id == 123, hasher) {
///     group_hash::hash_table::Entry::Vacant(entry) => {
///         entry.insert(Person {
///             id: 123,
///             name: "Alice".to_string(),
///         });
///     }
///     group_hash::hash_table::Entry::Occupied(_) => {
///         println!("Person already exists");
///     }
/// }
///
/// assert!(table.contains(hash_id(123), |p| p.id == 123));
/// ```
pub struct HashTable<V, A: Allocator = Global> {
    storage: Storage,
    items: usize,
    growth_left: usize,
    alloc: A,
    _phantom: PhantomData<V>,
}

// SAFETY: The table owns its values and storage exclusively.
unsafe impl<V: Send, A: Allocator + Send> Send for HashTable<V, A> {}
// SAFETY: Shared access only hands out shared references to values.
unsafe impl<V: Sync, A: Allocator + Sync> Sync for HashTable<V, A> {}

impl<V, A: Allocator> Debug for HashTable<V, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use alloc::format;
        use alloc::string::String;
        use alloc::vec::Vec;

        let Storage::Allocated(raw) = &self.storage else {
            return f
                .debug_struct("HashTable")
                .field("control", &"empty")
                .field("populated", &self.items)
                .field("capacity", &0usize)
                .finish();
        };

        let groups = (raw.buckets() + GROUP_WIDTH - 1) / GROUP_WIDTH;
        let control = (0..groups)
            .map(|group| {
                let start = group * GROUP_WIDTH;
                let end = (start + GROUP_WIDTH).min(raw.buckets());
                (start..end)
                    // SAFETY: `index` is below `buckets()`.
                    .map(|index| match Control::from(unsafe { raw.ctrl_byte(index) }) {
                        Control::Empty => String::from(".."),
                        Control::Deleted => String::from("xx"),
                        Control::Sentinel => String::from("||"),
                        Control::Full(fragment) => format!("{fragment:02x}"),
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect::<Vec<_>>();

        f.debug_struct("HashTable")
            .field("control", &control)
            .field("populated", &self.items)
            .field("capacity", &raw.capacity.max_items())
            .field("growth_left", &self.growth_left)
            .finish()
    }
}

impl<V, A> Clone for HashTable<V, A>
where
    V: Clone,
    A: Allocator + Clone,
{
    fn clone(&self) -> Self {
        let mut new_table = Self::new_in(self.alloc.clone());
        let Storage::Allocated(raw) = &self.storage else {
            return new_table;
        };

        let copy = infallible(RawStorage::allocate::<V, A>(
            &new_table.alloc,
            raw.capacity,
            Fallibility::Infallible,
        ));
        new_table.storage = Storage::Allocated(copy);
        let Storage::Allocated(copy) = &new_table.storage else {
            unreachable!()
        };

        // Control bytes are published one slot at a time so a panicking
        // `clone` leaves `new_table` droppable.
        let mut iter = raw.raw_iter::<V>(self.items);
        while let Some(index) = iter.next() {
            // SAFETY: `index` is a full slot of `raw`, and the same index is
            // in bounds for `copy`, which has the same capacity.
            unsafe {
                let value = (*raw.slot::<V>(index)).clone();
                copy.slot::<V>(index).write(value);
                copy.set_ctrl(index, raw.ctrl_byte(index));
            }
            new_table.items += 1;
        }

        // SAFETY: Both control regions hold `buckets()` per-slot bytes.
        unsafe {
            core::ptr::copy_nonoverlapping(raw.ctrl(), copy.ctrl(), raw.buckets());
        }
        new_table.growth_left = self.growth_left;
        debug_assert_eq!(new_table.items, self.items);

        new_table
    }
}

impl<V, A: Allocator> Drop for HashTable<V, A> {
    fn drop(&mut self) {
        self.drop_elements();
        if let Storage::Allocated(raw) = core::mem::replace(&mut self.storage, Storage::Empty) {
            // SAFETY: `raw` was allocated by `self.alloc`.
            unsafe { raw.free(&self.alloc) };
        }
    }
}

impl<V> HashTable<V, Global> {
    /// Creates an empty table. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::new();
    /// assert_eq!(table.capacity(), 0);
    /// ```
    pub const fn new() -> Self {
        Self::new_in(Global)
    }

    /// Creates a new hash table that holds at least `capacity` elements
    /// without reallocating.
    ///
    /// The actual capacity is the smallest tier that covers the request.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String> = HashTable::with_capacity(100);
    /// assert!(table.capacity() >= 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<V> Default for HashTable<V, Global> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, A: Allocator> HashTable<V, A> {
    /// Creates an empty table that will allocate from `alloc`.
    pub const fn new_in(alloc: A) -> Self {
        Self {
            storage: Storage::Empty,
            items: 0,
            growth_left: 0,
            alloc,
            _phantom: PhantomData,
        }
    }

    /// Creates a table with room for `capacity` elements, allocated from
    /// `alloc`.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let mut table = Self::new_in(alloc);
        if capacity != 0 {
            infallible(table.resize_to_fit(capacity, &|_: &V| 0, Fallibility::Infallible));
        }
        table
    }

    /// The allocator backing this table.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.items
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// Number of elements the table can hold before it has to grow.
    ///
    /// Zero for a table that has not allocated.
    pub fn capacity(&self) -> usize {
        match &self.storage {
            Storage::Empty => 0,
            Storage::Allocated(raw) => raw.capacity.max_items(),
        }
    }

    /// Room left before the table reaches [`capacity`](Self::capacity).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::with_capacity(3);
    /// table.insert_unique(1, 1u64, |v| *v);
    /// assert_eq!(table.slack(), table.capacity() - 1);
    /// ```
    pub fn slack(&self) -> usize {
        self.capacity() - self.items
    }

    /// Number of slots in the current allocation, 0 when unallocated.
    pub fn buckets(&self) -> usize {
        match &self.storage {
            Storage::Empty => 0,
            Storage::Allocated(raw) => raw.buckets(),
        }
    }

    #[inline(always)]
    fn find_index(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<usize> {
        match &self.storage {
            Storage::Empty => None,
            // SAFETY: Full control bytes always guard initialized values.
            Storage::Allocated(raw) => unsafe { raw.find(hash, eq) },
        }
    }

    #[inline(always)]
    fn raw(&self) -> &RawStorage {
        match &self.storage {
            Storage::Allocated(raw) => raw,
            Storage::Empty => unreachable!("table storage is not allocated"),
        }
    }

    /// Returns a reference to the value matching `eq`, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(7, (7u64, "seven"), |&(k, _)| k);
    ///
    /// assert_eq!(table.find(7, |&(k, _)| k == 7), Some(&(7, "seven")));
    /// assert_eq!(table.find(8, |&(k, _)| k == 8), None);
    /// ```
    #[inline]
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns full slots.
        Some(unsafe { &*self.raw().slot::<V>(index) })
    }

    /// Returns a mutable reference to the value matching `eq`, if any.
    #[inline]
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns full slots, and `&mut self`
        // guarantees exclusive access.
        Some(unsafe { &mut *self.raw().slot::<V>(index) })
    }

    /// Returns `true` if a value matching `eq` is present.
    #[inline]
    pub fn contains(&self, hash: u64, eq: impl Fn(&V) -> bool) -> bool {
        self.find_index(hash, eq).is_some()
    }

    /// Inserts `value` without checking whether an equal value exists.
    ///
    /// The value lands in the first empty or deleted slot on the probe
    /// sequence of `hash`. If that slot is empty and the table has no growth
    /// left, the table is rehashed first.
    ///
    /// Inserting a value equal to one already present leaves both in the
    /// table; lookups then return whichever is met first. Use
    /// [`entry`](Self::entry) for insert-or-update.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// for k in 0..100u64 {
    ///     table.insert_unique(k.wrapping_mul(0x9E37_79B9_7F4A_7C15), k, |v| {
    ///         v.wrapping_mul(0x9E37_79B9_7F4A_7C15)
    ///     });
    /// }
    /// assert_eq!(table.len(), 100);
    /// ```
    pub fn insert_unique(&mut self, hash: u64, value: V, hasher: impl Fn(&V) -> u64) -> &mut V {
        let index = self.prepare_insert(hash, &hasher);
        // SAFETY: `prepare_insert` returned a free slot with growth budget.
        unsafe { self.record_insert(index, hash, value) }
    }

    /// Gets an entry for the given hash and equality predicate.
    ///
    /// If no value matches, the table is grown as needed up front so that
    /// the returned [`VacantEntry`] can insert without rehashing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::Entry;
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, u32)> = HashTable::new();
    /// let hasher = |&(k, _): &(u64, u32)| k;
    ///
    /// *table.entry(5, |&(k, _)| k == 5, hasher).or_insert((5, 0)) = (5, 1);
    /// match table.entry(5, |&(k, _)| k == 5, hasher) {
    ///     Entry::Occupied(mut entry) => entry.get_mut().1 += 1,
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// assert_eq!(table.find(5, |&(k, _)| k == 5), Some(&(5, 2)));
    /// ```
    pub fn entry(
        &mut self,
        hash: u64,
        eq: impl Fn(&V) -> bool,
        hasher: impl Fn(&V) -> u64,
    ) -> Entry<'_, V, A> {
        if let Some(index) = self.find_index(hash, eq) {
            return Entry::Occupied(OccupiedEntry { table: self, index });
        }

        let index = self.prepare_insert(hash, &hasher);
        Entry::Vacant(VacantEntry {
            table: self,
            index,
            hash,
        })
    }

    /// Pick the slot a new value with `hash` will occupy, growing first if
    /// the slot is empty and the growth budget is spent.
    #[inline]
    fn prepare_insert(&mut self, hash: u64, hasher: &impl Fn(&V) -> u64) -> usize {
        if let Storage::Allocated(raw) = &self.storage {
            let index = raw.find_insert_slot(hash);
            // SAFETY: `index` is a slot of `raw`.
            if self.growth_left > 0 || unsafe { raw.ctrl_byte(index) } == DELETED {
                return index;
            }
        }

        infallible(self.reserve_rehash(1, hasher, Fallibility::Infallible));
        self.raw().find_insert_slot(hash)
    }

    /// # Safety
    ///
    /// `index` must come from `prepare_insert` (or `find_insert_slot` with a
    /// non-zero growth budget) with no table mutation in between.
    #[inline]
    unsafe fn record_insert(&mut self, index: usize, hash: u64, value: V) -> &mut V {
        let raw = self.raw();
        // SAFETY: Caller guarantees `index` is a free slot of this storage.
        unsafe {
            let old = raw.ctrl_byte(index);
            debug_assert!(old == EMPTY || old == DELETED);
            raw.set_ctrl(index, control::fragment(hash));
            let slot = raw.slot::<V>(index);
            slot.write(value);

            self.growth_left -= (old == EMPTY) as usize;
            self.items += 1;
            &mut *slot
        }
    }

    /// Removes and returns a value from the table.
    ///
    /// The value is identified by its hash and an equality predicate. If the
    /// slot's group still has an empty byte the slot becomes empty again;
    /// otherwise it becomes a tombstone so that values probing past this
    /// group stay reachable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(42, 42u64, |v| *v);
    ///
    /// assert_eq!(table.remove(42, |&v| v == 42), Some(42));
    /// assert!(table.is_empty());
    /// assert_eq!(table.remove(99, |&v| v == 99), None);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let index = self.find_index(hash, eq)?;
        // SAFETY: `find_index` only returns full slots.
        Some(unsafe { self.remove_at(index) })
    }

    /// Mark `index` free and move its value out.
    ///
    /// # Safety
    ///
    /// `index` must be a full slot.
    unsafe fn remove_at(&mut self, index: usize) -> V {
        let raw = self.raw();
        // SAFETY: Caller guarantees `index` is a full slot; its group start is
        // readable.
        unsafe {
            let group = raw.group_at(raw.group_start(index));
            let byte = if group.match_empty().any_bit_set() {
                EMPTY
            } else {
                DELETED
            };
            raw.set_ctrl(index, byte);
            let value = raw.slot::<V>(index).read();

            self.growth_left += (byte == EMPTY) as usize;
            self.items -= 1;
            value
        }
    }

    fn drop_elements(&mut self) {
        if !core::mem::needs_drop::<V>() || self.items == 0 {
            return;
        }

        let raw = self.raw();
        let mut iter = raw.raw_iter::<V>(self.items);
        while let Some(index) = iter.next() {
            // SAFETY: Each full slot is dropped exactly once.
            unsafe { raw.slot::<V>(index).drop_in_place() };
        }
    }

    /// Removes all elements from the table.
    ///
    /// Keeps the allocation: capacity is unchanged and no memory is
    /// allocated or freed. Tombstones are cleared as well.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(1, 1u64, |v| *v);
    /// table.insert_unique(2, 2u64, |v| *v);
    /// let capacity = table.capacity();
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn clear(&mut self) {
        self.drop_elements();
        self.items = 0;
        if let Storage::Allocated(raw) = &self.storage {
            raw.reset_ctrl();
            self.growth_left = raw.capacity.max_items();
        }
    }

    /// Removes all elements and returns the storage to the allocator.
    ///
    /// Afterwards the table is in the same state as a new one.
    pub fn clear_shrink(&mut self) {
        self.drop_elements();
        self.items = 0;
        self.release();
    }

    fn release(&mut self) {
        debug_assert_eq!(self.items, 0);
        self.growth_left = 0;
        if let Storage::Allocated(raw) = core::mem::replace(&mut self.storage, Storage::Empty) {
            // SAFETY: `raw` was allocated by `self.alloc` and holds no values.
            unsafe { raw.free(&self.alloc) };
        }
    }

    /// Shrinks the table to the smallest tier that holds its elements.
    ///
    /// An empty table gives its storage back entirely. A table already at its
    /// smallest tier is only rebuilt if it carries tombstones.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::with_capacity(1000);
    /// table.insert_unique(5, 5, |v| *v);
    /// table.insert_unique(10, 10, |v| *v);
    ///
    /// table.shrink_to_fit(|v| *v);
    /// assert_eq!(table.capacity(), 3);
    /// ```
    pub fn shrink_to_fit(&mut self, hasher: impl Fn(&V) -> u64) {
        if self.items == 0 {
            self.release();
            return;
        }

        let Some(target) = Capacity::for_items(self.items) else {
            return;
        };
        let raw = self.raw();
        let has_tombstones = self.growth_left < raw.capacity.max_items() - self.items;
        if target.buckets < raw.buckets() || has_tombstones {
            infallible(self.resize(target, &hasher, Fallibility::Infallible));
        }
    }

    /// Reserves capacity for at least `additional` more elements.
    ///
    /// Does nothing if `len() + additional` already fits in
    /// [`capacity`](Self::capacity); otherwise moves to the smallest tier
    /// that fits. Tombstones still count against the growth budget, so a
    /// heavily churned table may rebuild once more at the same size during
    /// later insertions.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity overflows `usize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64> = HashTable::new();
    /// table.reserve(25, |v| *v);
    /// let capacity = table.capacity();
    /// assert!(capacity >= 25);
    ///
    /// table.reserve(3, |v| *v);
    /// assert_eq!(table.capacity(), capacity);
    /// ```
    pub fn reserve(&mut self, additional: usize, hasher: impl Fn(&V) -> u64) {
        if additional > self.slack() {
            infallible(self.grow_for(additional, &hasher, Fallibility::Infallible));
        }
    }

    /// Like [`reserve`](Self::reserve), but reports failure instead of
    /// panicking or aborting. The table is untouched on error.
    pub fn try_reserve(
        &mut self,
        additional: usize,
        hasher: impl Fn(&V) -> u64,
    ) -> Result<(), TryReserveError> {
        if additional > self.slack() {
            self.grow_for(additional, &hasher, Fallibility::Fallible)
        } else {
            Ok(())
        }
    }

    fn grow_for(
        &mut self,
        additional: usize,
        hasher: &impl Fn(&V) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let new_items = self
            .items
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        self.resize_to_fit(new_items, hasher, fallibility)
    }

    /// Called when an insertion found no growth budget.
    #[cold]
    #[inline(never)]
    fn reserve_rehash(
        &mut self,
        additional: usize,
        hasher: &impl Fn(&V) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        debug_assert_ne!(additional, 0);
        let new_items = self
            .items
            .checked_add(additional)
            .ok_or_else(|| fallibility.capacity_overflow())?;
        let full_capacity = self.capacity();

        if new_items <= full_capacity / 2 {
            // Mostly tombstones: rebuild at the same size.
            let capacity = self.raw().capacity;
            self.resize(capacity, hasher, fallibility)
        } else {
            self.resize_to_fit(new_items.max(full_capacity + 1), hasher, fallibility)
        }
    }

    fn resize_to_fit(
        &mut self,
        items: usize,
        hasher: &impl Fn(&V) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        let capacity = Capacity::for_items(items).ok_or_else(|| fallibility.capacity_overflow())?;
        self.resize(capacity, hasher, fallibility)
    }

    /// Move every value into fresh storage of `capacity`, then free the old
    /// storage.
    ///
    /// Nothing is modified until the new storage is allocated. If `hasher`
    /// panics, the new storage is freed and the table is left as it was.
    fn resize(
        &mut self,
        capacity: Capacity,
        hasher: &impl Fn(&V) -> u64,
        fallibility: Fallibility,
    ) -> Result<(), TryReserveError> {
        debug_assert!(self.items <= capacity.max_items());
        let new_storage = RawStorage::allocate::<V, A>(&self.alloc, capacity, fallibility)?;
        let guard = StorageGuard {
            storage: ManuallyDrop::new(new_storage),
            alloc: &self.alloc,
        };

        if let Storage::Allocated(old) = &self.storage {
            let mut iter = old.raw_iter::<V>(self.items);
            while let Some(index) = iter.next() {
                // SAFETY: `index` is a full slot of `old`; the new storage has
                // no tombstones and room for every value, so the slot found is
                // empty and distinct for each value.
                unsafe {
                    let value = old.slot::<V>(index);
                    let hash = hasher(&*value);
                    let new_index = guard.storage.find_insert_slot(hash);
                    guard.storage.set_ctrl(new_index, control::fragment(hash));
                    core::ptr::copy_nonoverlapping(value, guard.storage.slot::<V>(new_index), 1);
                }
            }
        }

        let new_storage = guard.into_inner();
        self.growth_left = capacity.max_items() - self.items;
        if let Storage::Allocated(old) =
            core::mem::replace(&mut self.storage, Storage::Allocated(new_storage))
        {
            // SAFETY: Every value has been moved out bitwise; only the memory
            // remains to be returned.
            unsafe { old.free(&self.alloc) };
        }

        Ok(())
    }

    /// Returns an iterator over all values in the table.
    ///
    /// The iterator yields `&V` references in an arbitrary order that may
    /// change after any mutation.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.raw_iter(),
            _marker: PhantomData,
        }
    }

    /// Returns an iterator yielding mutable references to all values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.raw_iter(),
            _marker: PhantomData,
        }
    }

    fn raw_iter(&self) -> RawIter<V> {
        match &self.storage {
            Storage::Empty => RawIter::empty(),
            Storage::Allocated(raw) => raw.raw_iter(self.items),
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// The allocation is kept. Values not consumed by the iterator are
    /// dropped when it is.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::hash_table::HashTable;
    /// #
    /// let mut table = HashTable::new();
    /// table.insert_unique(1, "a".to_string(), |_| 1);
    ///
    /// let values: Vec<String> = table.drain().collect();
    /// assert!(table.is_empty());
    /// assert_eq!(values, ["a"]);
    /// ```
    pub fn drain(&mut self) -> Drain<'_, V, A> {
        let storage = core::mem::replace(&mut self.storage, Storage::Empty);
        let items = core::mem::replace(&mut self.items, 0);
        self.growth_left = 0;

        let iter = match &storage {
            Storage::Empty => RawIter::empty(),
            Storage::Allocated(raw) => raw.raw_iter(items),
        };

        Drain {
            table: self,
            storage,
            iter,
        }
    }

    /// Keeps only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&mut V) -> bool) {
        let mut iter = self.raw_iter();
        while let Some(index) = iter.next() {
            // SAFETY: `index` is a full slot; removing it only rewrites its own
            // control byte, which the iterator has already consumed.
            unsafe {
                if !f(&mut *iter.slot(index)) {
                    drop(self.remove_at(index));
                }
            }
        }
    }

    /// Removes and yields the values for which `f` returns `true`.
    ///
    /// Values the iterator does not reach stay in the table.
    pub fn extract_if<F>(&mut self, f: F) -> ExtractIf<'_, V, F, A>
    where
        F: FnMut(&mut V) -> bool,
    {
        ExtractIf {
            iter: self.raw_iter(),
            table: self,
            f,
        }
    }

    /// Statistics about the table's current layout.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let (buckets, capacity, total_bytes) = match &self.storage {
            Storage::Empty => (0, 0, 0),
            Storage::Allocated(raw) => (
                raw.buckets(),
                raw.capacity.max_items(),
                raw.layout.layout.size(),
            ),
        };
        let tombstones = capacity - self.items - self.growth_left;

        DebugStats {
            populated: self.items,
            capacity,
            buckets,
            tombstones,
            growth_left: self.growth_left,
            load_factor: if capacity == 0 {
                0.0
            } else {
                self.items as f64 / capacity as f64
            },
            slot_utilization: if buckets == 0 {
                0.0
            } else {
                self.items as f64 / buckets as f64
            },
            total_bytes,
            wasted_bytes: (buckets - self.items) * core::mem::size_of::<V>(),
            backend: crate::group::BACKEND,
        }
    }

    /// Distribution of probe lengths over all elements.
    ///
    /// `hasher` must be the hasher used to insert the values.
    #[cfg(any(test, feature = "stats"))]
    pub fn probe_histogram(&self, hasher: impl Fn(&V) -> u64) -> ProbeHistogram {
        let mut counts = alloc::vec::Vec::new();
        let Storage::Allocated(raw) = &self.storage else {
            return ProbeHistogram { counts };
        };

        let mut iter = raw.raw_iter::<V>(self.items);
        while let Some(index) = iter.next() {
            // SAFETY: `index` is a full slot.
            let hash = hasher(unsafe { &*raw.slot::<V>(index) });
            let home = raw.group_start(index) / GROUP_WIDTH;
            let length = ProbeSeq::new(hash, raw.capacity.group_mask())
                .position(|group| group == home)
                .unwrap_or(0);
            if counts.len() <= length {
                counts.resize(length + 1, 0);
            }
            counts[length] += 1;
        }

        ProbeHistogram { counts }
    }
}

impl<V, A: Allocator> IntoIterator for HashTable<V, A> {
    type Item = V;
    type IntoIter = IntoIter<V, A>;

    fn into_iter(self) -> IntoIter<V, A> {
        let iter = self.raw_iter();
        let table = ManuallyDrop::new(self);
        // SAFETY: `table` is never used or dropped again, so each field is
        // moved out exactly once.
        let (storage, alloc) = unsafe {
            (
                core::ptr::read(&table.storage),
                core::ptr::read(&table.alloc),
            )
        };

        IntoIter {
            iter,
            storage,
            alloc,
        }
    }
}

impl<'a, V, A: Allocator> IntoIterator for &'a HashTable<V, A> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V, A: Allocator> IntoIterator for &'a mut HashTable<V, A> {
    type Item = &'a mut V;
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, A: Allocator = Global> {
    /// No value matched; holds a reserved free slot.
    Vacant(VacantEntry<'a, V, A>),
    /// A value matched.
    Occupied(OccupiedEntry<'a, V, A>),
}

impl<'a, V, A: Allocator> Entry<'a, V, A> {
    /// Returns the existing value, or inserts `default`.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Returns the existing value, or inserts the result of `default`.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Applies `f` to an existing value; returns `None` for a vacant entry.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Option<&'a mut V> {
        match self {
            Entry::Occupied(entry) => {
                let value = entry.into_mut();
                f(value);
                Some(value)
            }
            Entry::Vacant(_) => None,
        }
    }

    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the hash table.
///
/// The slot is reserved up front; [`insert`](Self::insert) never rehashes.
pub struct VacantEntry<'a, V, A: Allocator = Global> {
    table: &'a mut HashTable<V, A>,
    index: usize,
    hash: u64,
}

impl<'a, V, A: Allocator> VacantEntry<'a, V, A> {
    /// Inserts `value` into the reserved slot.
    pub fn insert(self, value: V) -> &'a mut V {
        // SAFETY: `index` came from `prepare_insert` and the exclusive borrow
        // has prevented any mutation since.
        unsafe { self.table.record_insert(self.index, self.hash, value) }
    }
}

/// A view into an occupied entry in the hash table.
pub struct OccupiedEntry<'a, V, A: Allocator = Global> {
    table: &'a mut HashTable<V, A>,
    index: usize,
}

impl<'a, V, A: Allocator> OccupiedEntry<'a, V, A> {
    /// The matched value.
    pub fn get(&self) -> &V {
        // SAFETY: `index` is a full slot for the lifetime of the entry.
        unsafe { &*self.table.raw().slot::<V>(self.index) }
    }

    /// The matched value, mutably.
    pub fn get_mut(&mut self) -> &mut V {
        // SAFETY: As in `get`, with exclusive access through the entry.
        unsafe { &mut *self.table.raw().slot::<V>(self.index) }
    }

    /// Converts the entry into a mutable reference tied to the table.
    pub fn into_mut(self) -> &'a mut V {
        // SAFETY: As in `get_mut`.
        unsafe { &mut *self.table.raw().slot::<V>(self.index) }
    }

    /// Removes the matched value from the table.
    pub fn remove(self) -> V {
        // SAFETY: `index` is a full slot.
        unsafe { self.table.remove_at(self.index) }
    }
}

/// Walks the full slots of one storage, a group at a time.
///
/// Holds raw pointers only; the wrapper types tie it to a borrow or to owned
/// storage.
struct RawIter<V> {
    ctrl: *const u8,
    slots: NonNull<V>,
    group_start: usize,
    current: BitMask,
    remaining: usize,
}

impl<V> Clone for RawIter<V> {
    fn clone(&self) -> Self {
        RawIter {
            ctrl: self.ctrl,
            slots: self.slots,
            group_start: self.group_start,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

impl<V> RawIter<V> {
    fn empty() -> Self {
        RawIter {
            ctrl: core::ptr::null(),
            slots: NonNull::dangling(),
            group_start: 0,
            current: BitMask(0),
            remaining: 0,
        }
    }

    /// # Safety
    ///
    /// `index` must have been returned by this iterator and its storage must
    /// still be live.
    #[inline(always)]
    unsafe fn slot(&self, index: usize) -> *mut V {
        // SAFETY: Forwarded caller contract.
        unsafe { self.slots.as_ptr().add(index) }
    }
}

impl<V> Iterator for RawIter<V> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }

        loop {
            if let Some(bit) = self.current.lowest_set_bit() {
                self.current = self.current.remove_lowest_bit();
                self.remaining -= 1;
                return Some(self.group_start + bit);
            }

            // A full slot is still ahead, so the next group lies before the
            // sentinel.
            self.group_start += GROUP_WIDTH;
            // SAFETY: See above.
            self.current = unsafe { Group::load(self.ctrl.add(self.group_start)) }.match_full();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`iter`] method on [`HashTable`].
/// It yields `&V` references in an arbitrary order.
///
/// [`iter`]: HashTable::iter
pub struct Iter<'a, V> {
    inner: RawIter<V>,
    _marker: PhantomData<&'a V>,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<&'a V> {
        let index = self.inner.next()?;
        // SAFETY: The table is borrowed for `'a` and `index` is full.
        Some(unsafe { &*self.inner.slot(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
impl<V> FusedIterator for Iter<'_, V> {}

// SAFETY: `Iter` behaves like `&V`.
unsafe impl<V: Sync> Send for Iter<'_, V> {}
// SAFETY: As above.
unsafe impl<V: Sync> Sync for Iter<'_, V> {}

/// A mutable iterator over the values in a [`HashTable`].
pub struct IterMut<'a, V> {
    inner: RawIter<V>,
    _marker: PhantomData<&'a mut V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = &'a mut V;

    #[inline]
    fn next(&mut self) -> Option<&'a mut V> {
        let index = self.inner.next()?;
        // SAFETY: The table is mutably borrowed for `'a` and each index is
        // yielded once.
        Some(unsafe { &mut *self.inner.slot(index) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}
impl<V> FusedIterator for IterMut<'_, V> {}

// SAFETY: `IterMut` behaves like `&mut V`.
unsafe impl<V: Send> Send for IterMut<'_, V> {}
// SAFETY: As above.
unsafe impl<V: Sync> Sync for IterMut<'_, V> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
/// It yields owned `V` values and empties the table as it iterates. The
/// storage is detached from the table while draining and handed back, reset,
/// when the iterator is dropped.
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V, A: Allocator = Global> {
    table: &'a mut HashTable<V, A>,
    storage: Storage,
    iter: RawIter<V>,
}

impl<V, A: Allocator> Iterator for Drain<'_, V, A> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        let index = self.iter.next()?;
        // SAFETY: Each full slot is read exactly once and its control byte is
        // reset before the storage is reused.
        Some(unsafe { self.iter.slot(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V, A: Allocator> ExactSizeIterator for Drain<'_, V, A> {}
impl<V, A: Allocator> FusedIterator for Drain<'_, V, A> {}

// SAFETY: `Drain` owns the detached storage and borrows the table mutably.
unsafe impl<V: Send, A: Allocator + Send> Send for Drain<'_, V, A> {}
// SAFETY: Shared access to a `Drain` exposes no values.
unsafe impl<V: Sync, A: Allocator + Sync> Sync for Drain<'_, V, A> {}

impl<V, A: Allocator> Drop for Drain<'_, V, A> {
    fn drop(&mut self) {
        for _ in &mut *self {}

        if let Storage::Allocated(raw) = &self.storage {
            raw.reset_ctrl();
            self.table.growth_left = raw.capacity.max_items();
        }
        self.table.storage = core::mem::replace(&mut self.storage, Storage::Empty);
    }
}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V, A: Allocator = Global> {
    iter: RawIter<V>,
    storage: Storage,
    alloc: A,
}

impl<V, A: Allocator> Iterator for IntoIter<V, A> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        let index = self.iter.next()?;
        // SAFETY: Each full slot is read exactly once.
        Some(unsafe { self.iter.slot(index).read() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<V, A: Allocator> ExactSizeIterator for IntoIter<V, A> {}
impl<V, A: Allocator> FusedIterator for IntoIter<V, A> {}

// SAFETY: `IntoIter` owns the remaining values and their storage.
unsafe impl<V: Send, A: Allocator + Send> Send for IntoIter<V, A> {}
// SAFETY: Shared access to an `IntoIter` exposes no values.
unsafe impl<V: Sync, A: Allocator + Sync> Sync for IntoIter<V, A> {}

impl<V, A: Allocator> Drop for IntoIter<V, A> {
    fn drop(&mut self) {
        for _ in &mut *self {}

        if let Storage::Allocated(raw) = core::mem::replace(&mut self.storage, Storage::Empty) {
            // SAFETY: `raw` came from `self.alloc`; all values were moved out.
            unsafe { raw.free(&self.alloc) };
        }
    }
}

/// Removes the values matching a predicate while iterating.
///
/// This struct is created by [`HashTable::extract_if`].
pub struct ExtractIf<'a, V, F, A: Allocator = Global>
where
    F: FnMut(&mut V) -> bool,
{
    table: &'a mut HashTable<V, A>,
    iter: RawIter<V>,
    f: F,
}

impl<V, F, A> Iterator for ExtractIf<'_, V, F, A>
where
    F: FnMut(&mut V) -> bool,
    A: Allocator,
{
    type Item = V;

    fn next(&mut self) -> Option<V> {
        loop {
            let index = self.iter.next()?;
            // SAFETY: `index` is a full slot; removing it only rewrites a
            // control byte the iterator has already consumed.
            unsafe {
                if (self.f)(&mut *self.iter.slot(index)) {
                    return Some(self.table.remove_at(index));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.iter.remaining))
    }
}

// SAFETY: `ExtractIf` borrows the table mutably and owns `f`.
unsafe impl<V, F, A> Send for ExtractIf<'_, V, F, A>
where
    V: Send,
    F: FnMut(&mut V) -> bool + Send,
    A: Allocator + Send,
{
}
