use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::Chain;
use core::iter::FusedIterator;

use crate::allocator::Allocator;
use crate::allocator::Global;
use crate::error::TryReserveError;
use crate::hash_table;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A set of unique values over a [`HashTable<T, A>`].
///
/// Values are hashed with `S` and compared with `Eq`. Per slot the set costs
/// one control byte plus `size_of::<T>()`.
#[derive(Clone)]
pub struct HashSet<T, S, A: Allocator = Global> {
    table: HashTable<T, A>,
    hash_builder: S,
}

impl<T, S, A> PartialEq for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_subset(other)
    }
}

impl<T, S, A> Eq for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
}

impl<T, S, A> Debug for HashSet<T, S, A>
where
    T: Debug,
    A: Allocator,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> HashSet<T, S, Global> {
    /// An empty set hashing with `hash_builder`. Does not allocate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set = HashSet::with_hasher(DefaultHashBuilder::default());
    /// set.insert(2);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        Self::with_hasher_in(hash_builder, Global)
    }

    /// A set with room for `capacity` values before it first grows.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        Self::with_capacity_and_hasher_in(capacity, hash_builder, Global)
    }
}

impl<T, S> HashSet<T, S, Global>
where
    S: Default,
{
    /// An empty set with a default-constructed hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// assert!(set.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Like [`with_capacity_and_hasher`](Self::with_capacity_and_hasher) with
    /// `S::default()`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, S::default())
    }
}

impl<T, S> Default for HashSet<T, S, Global>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S, A: Allocator> HashSet<T, S, A> {
    /// Creates an empty set that allocates from `alloc`.
    pub const fn with_hasher_in(hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::new_in(alloc),
            hash_builder,
        }
    }

    /// Creates a set with room for `capacity` elements, allocated from
    /// `alloc`.
    pub fn with_capacity_and_hasher_in(capacity: usize, hash_builder: S, alloc: A) -> Self {
        Self {
            table: HashTable::with_capacity_in(capacity, alloc),
            hash_builder,
        }
    }

    /// The set's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// The allocator backing this set.
    pub fn allocator(&self) -> &A {
        self.table.allocator()
    }

    /// Number of values stored.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether `len() == 0`.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Values the current allocation holds before growing; 0 when unallocated.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// `capacity() - len()`.
    pub fn slack(&self) -> usize {
        self.table.slack()
    }

    /// Drops every value. Keeps the allocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// set.insert(1);
    /// set.clear();
    /// assert!(set.is_empty());
    /// assert!(set.capacity() > 0);
    /// ```
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Clears the set and frees its storage.
    pub fn clear_shrink(&mut self) {
        self.table.clear_shrink();
    }

    /// Borrowing iterator over the values, in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Moves every value out. The set is empty, with its allocation kept,
    /// once the iterator is dropped.
    pub fn drain(&mut self) -> Drain<'_, T, A> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Drops every value for which `f` returns `false`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32, DefaultHashBuilder> = (1..=4).collect();
    ///
    /// set.retain(|&x| x % 2 == 0);
    /// assert_eq!(set.len(), 2);
    /// assert!(set.contains(&2));
    /// assert!(set.contains(&4));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.table.retain(|v| f(v));
    }

    /// Lazily removes and yields the values matching `f`.
    ///
    /// Values the iterator has not reached when it is dropped stay in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32, DefaultHashBuilder> = (1..=4).collect();
    ///
    /// let extracted: Vec<_> = set.extract_if(|&x| x % 2 == 0).collect();
    /// assert_eq!(set.len(), 2);
    /// assert_eq!(extracted.len(), 2);
    /// assert!(set.contains(&1));
    /// assert!(set.contains(&3));
    /// ```
    pub fn extract_if<F>(
        &mut self,
        mut f: F,
    ) -> hash_table::ExtractIf<'_, T, impl FnMut(&mut T) -> bool, A>
    where
        F: FnMut(&T) -> bool,
    {
        self.table.extract_if(move |v| f(v))
    }
}

impl<T, S, A> HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    /// Moves to the smallest tier that fits `len()`, or frees the storage of
    /// an empty set.
    pub fn shrink_to_fit(&mut self) {
        self.table
            .shrink_to_fit(|v| self.hash_builder.hash_one(v));
    }

    /// Makes room for `additional` more values with at most one allocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<u32, DefaultHashBuilder> = HashSet::new();
    /// set.reserve(25);
    /// let capacity = set.capacity();
    /// assert!(capacity >= 25);
    ///
    /// set.reserve(3);
    /// assert_eq!(set.capacity(), capacity);
    /// ```
    pub fn reserve(&mut self, additional: usize) {
        self.table
            .reserve(additional, |v| self.hash_builder.hash_one(v));
    }

    /// Fallible [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.table
            .try_reserve(additional, |v| self.hash_builder.hash_one(v))
    }

    /// Inserts `value` unless an equal value is present. Returns `true` when
    /// it was inserted; an existing equal value is left in place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// assert_eq!(set.insert(37), true);
    /// assert_eq!(set.insert(37), false);
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                true
            }
        }
    }

    /// Whether a value equal to `value` is stored. `value` may be any borrowed
    /// form of `T`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.contains(hash, |v| v.borrow() == value)
    }

    /// Removes the value equal to `value`, reporting whether there was one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let mut set: HashSet<i32, DefaultHashBuilder> = HashSet::new();
    /// set.insert(1);
    /// assert_eq!(set.remove(&1), true);
    /// assert_eq!(set.remove(&1), false);
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.take(value).is_some()
    }

    /// Inserts `value`, swapping out and returning an equal value that was
    /// already stored.
    pub fn replace(&mut self, value: T) -> Option<T> {
        let hash = self.hash_builder.hash_one(&value);
        match self
            .table
            .entry(hash, |v| v == &value, |v| self.hash_builder.hash_one(v))
        {
            TableEntry::Occupied(mut entry) => Some(core::mem::replace(entry.get_mut(), value)),
            TableEntry::Vacant(entry) => {
                entry.insert(value);
                None
            }
        }
    }

    /// Removes the value equal to `value` and hands it back.
    pub fn take<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.remove(hash, |v| v.borrow() == value)
    }

    /// The stored value equal to `value`.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(value);
        self.table.find(hash, |v| v.borrow() == value)
    }

    /// Whether no value is in both sets. Walks the smaller set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let a: HashSet<i32, DefaultHashBuilder> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32, DefaultHashBuilder> = [3, 4].into_iter().collect();
    ///
    /// assert!(a.is_disjoint(&b));
    /// ```
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.intersection(other).next().is_none()
    }

    /// Whether every value of `self` is also in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.difference(other).next().is_none()
    }

    /// Whether every value of `other` is also in `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_subset(self)
    }

    /// Values of `self`, then the values of `other` missing from `self`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let a: HashSet<i32, DefaultHashBuilder> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32, DefaultHashBuilder> = [2, 3].into_iter().collect();
    ///
    /// let union: Vec<_> = a.union(&b).copied().collect();
    /// assert_eq!(union.len(), 3);
    /// ```
    pub fn union<'a>(&'a self, other: &'a Self) -> Union<'a, T, S, A> {
        Union {
            iter: self.iter().chain(other.difference(self)),
        }
    }

    /// Values present in both sets, found by walking the smaller one.
    pub fn intersection<'a>(&'a self, other: &'a Self) -> Intersection<'a, T, S, A> {
        if self.len() <= other.len() {
            Intersection {
                iter: self.iter(),
                other,
            }
        } else {
            Intersection {
                iter: other.iter(),
                other: self,
            }
        }
    }

    /// Values of `self` missing from `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> Difference<'a, T, S, A> {
        Difference {
            iter: self.iter(),
            other,
        }
    }

    /// Values that are in one set but not the other.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use group_hash::DefaultHashBuilder;
    /// # use group_hash::HashSet;
    /// #
    /// let a: HashSet<i32, DefaultHashBuilder> = [1, 2].into_iter().collect();
    /// let b: HashSet<i32, DefaultHashBuilder> = [2, 3].into_iter().collect();
    ///
    /// let mut sym_diff: Vec<_> = a.symmetric_difference(&b).copied().collect();
    /// sym_diff.sort();
    /// assert_eq!(sym_diff, [1, 3]);
    /// ```
    pub fn symmetric_difference<'a>(&'a self, other: &'a Self) -> SymmetricDifference<'a, T, S, A> {
        SymmetricDifference {
            iter: self.difference(other).chain(other.difference(self)),
        }
    }
}

/// Returned by [`HashSet::iter`].
pub struct Iter<'a, T> {
    inner: hash_table::Iter<'a, T>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Returned by [`HashSet::drain`].
pub struct Drain<'a, T, A: Allocator = Global> {
    inner: hash_table::Drain<'a, T, A>,
}

impl<T, A: Allocator> Iterator for Drain<'_, T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> ExactSizeIterator for Drain<'_, T, A> {}

/// Consumes a [`HashSet`], yielding its values.
pub struct IntoIter<T, A: Allocator = Global> {
    inner: hash_table::IntoIter<T, A>,
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, S, A: Allocator> IntoIterator for HashSet<T, S, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, T, S, A: Allocator> IntoIterator for &'a HashSet<T, S, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, S> FromIterator<T> for HashSet<T, S, Global>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, S, A> Extend<T> for HashSet<T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let additional = if self.is_empty() {
            iter.size_hint().0
        } else {
            iter.size_hint().0.div_ceil(2)
        };
        self.reserve(additional);
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T, S, A> Extend<&'a T> for HashSet<T, S, A>
where
    T: Hash + Eq + Copy + 'a,
    S: BuildHasher,
    A: Allocator,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

/// Returned by [`HashSet::union`].
pub struct Union<'a, T, S, A: Allocator = Global> {
    iter: Chain<Iter<'a, T>, Difference<'a, T, S, A>>,
}

impl<'a, T, S, A> Iterator for Union<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Returned by [`HashSet::intersection`].
pub struct Intersection<'a, T, S, A: Allocator = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, A>,
}

impl<'a, T, S, A> Iterator for Intersection<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.find(|v| other.contains(*v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

/// Returned by [`HashSet::difference`].
pub struct Difference<'a, T, S, A: Allocator = Global> {
    iter: Iter<'a, T>,
    other: &'a HashSet<T, S, A>,
}

impl<'a, T, S, A> Iterator for Difference<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let other = self.other;
        self.iter.find(|v| !other.contains(*v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.iter.size_hint().1)
    }
}

/// Returned by [`HashSet::symmetric_difference`].
pub struct SymmetricDifference<'a, T, S, A: Allocator = Global> {
    iter: Chain<Difference<'a, T, S, A>, Difference<'a, T, S, A>>,
}

impl<'a, T, S, A> Iterator for SymmetricDifference<'a, T, S, A>
where
    T: Hash + Eq,
    S: BuildHasher,
    A: Allocator,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
