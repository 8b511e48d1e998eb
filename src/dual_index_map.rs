//! DualIndexMap: ordered key/value store indexed by key hash and by value hash.

use crate::capacity::{Layout, MAX_CAPACITY, MIN_CAPACITY};
use crate::chain::Chain;
use crate::entry::{Entry, HashValue, Slot};
use crate::error::{Error, Result};
use crate::iter::{Cursor, Direction, IntoIter, Iter, Keys, Values};
use crate::map_core::MapCore;
use crate::ordinal::Ordinal;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::ops::Index;
use hashbrown::hash_map::DefaultHashBuilder;

/// Insertion-ordered map with O(1) average lookup by key and by value.
///
/// Entries live in one dense store in insertion order. Each entry is threaded
/// onto two hash chains: one addressed by its key hash, one by its value
/// hash. Keys are unique; values need not be, and value queries report the
/// earliest (`index_of`) or latest (`last_index_of`) match on the value chain.
///
/// Values are part of the index, so there is no `get_mut`; change a value by
/// inserting under the same key again.
pub struct DualIndexMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    core: MapCore<K, V>,
    /// Key most recently synthesized by `append`.
    last_key: Option<K>,
    reentrancy: DebugReentrancy,
}

#[inline]
fn hash_of<S, Q>(hasher: &S, q: &Q) -> HashValue
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    HashValue(hasher.hash_one(q))
}

impl<K, V> DualIndexMap<K, V> {
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    /// Create a map whose entry store holds `capacity` entries before it
    /// first grows.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`].
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for DualIndexMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> DualIndexMap<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(MIN_CAPACITY, hasher)
    }

    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_CAPACITY`].
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        assert!(
            capacity <= MAX_CAPACITY,
            "capacity {capacity} exceeds maximum {MAX_CAPACITY}"
        );
        Self {
            hasher,
            core: MapCore::with_layout(Layout::plan(capacity)),
            last_key: None,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.len() == 0
    }

    /// Size of the entry store; inserting past it triggers a full rehash.
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Number of buckets in each of the two hash indices.
    pub fn bucket_count(&self) -> usize {
        self.core.bucket_count()
    }

    /// Structural generation: bumped by every insert, overwrite, removal and
    /// clear. Resizing alone leaves it unchanged.
    pub fn generation(&self) -> u64 {
        self.core.generation()
    }

    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        self.core.entries()
    }

    /// Entry at `index` in positional order.
    pub fn get_index(&self, index: usize) -> Option<(&K, &V)> {
        self.core.entries().get(index).map(|e| (&e.key, &e.value))
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.core.entries().first().map(|e| (&e.key, &e.value))
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.core.entries().last().map(|e| (&e.key, &e.value))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.core.entries())
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.core.entries())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.core.entries())
    }

    /// Start a detached, fail-fast scan. See [`Cursor`].
    pub fn cursor(&self, direction: Direction) -> Cursor {
        Cursor::new(direction, self.core.generation(), self.core.len())
    }

    /// Remove every entry. Capacity and bucket count are kept, and the next
    /// `append` starts again from [`Ordinal::FIRST`].
    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        self.core.clear();
        self.last_key = None;
    }
}

impl<K, V, S> DualIndexMap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher,
{
    fn find_key<Q>(&self, key: &Q) -> Option<Slot>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = hash_of(&self.hasher, key);
        self.core
            .find(Chain::Key, hash, Direction::Forward, |e| e.key.borrow() == key)
    }

    fn find_value<Q>(&self, value: &Q, dir: Direction) -> Option<Slot>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = hash_of(&self.hasher, value);
        self.core
            .find(Chain::Value, hash, dir, |e| e.value.borrow() == value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.find_key(key).is_some()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get");
        self.find_key(key)
            .map(|s| &self.core.entries()[s.get()].value)
    }

    /// Keyed lookup that reports a miss as [`Error::KeyNotFound`].
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Position of `key` in iteration order.
    pub fn get_index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("get_index_of");
        self.find_key(key).map(Slot::get)
    }

    pub fn contains_value<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("contains_value");
        self.find_value(value, Direction::Forward).is_some()
    }

    /// Key of the first entry, walking the value chain from its head, whose
    /// value equals `value`.
    pub fn index_of<Q>(&self, value: &Q) -> Option<&K>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("index_of");
        self.find_value(value, Direction::Forward)
            .map(|s| &self.core.entries()[s.get()].key)
    }

    /// Like [`index_of`](Self::index_of), walking from the tail.
    pub fn last_index_of<Q>(&self, value: &Q) -> Option<&K>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("last_index_of");
        self.find_value(value, Direction::Backward)
            .map(|s| &self.core.entries()[s.get()].key)
    }

    /// Associate `value` with `key`.
    ///
    /// An existing key keeps its position and gets the new value; the
    /// previous value is returned. A new key is appended at the end, growing
    /// and rehashing the store first when it is full.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let _g = self.reentrancy.enter("insert");
        let key_hash = hash_of(&self.hasher, &key);
        let value_hash = hash_of(&self.hasher, &value);
        match self
            .core
            .find(Chain::Key, key_hash, Direction::Forward, |e| e.key == key)
        {
            Some(slot) => Ok(Some(self.core.replace_value(slot, value, value_hash))),
            None => {
                self.core
                    .push(Entry::new(key, key_hash, value, value_hash))?;
                Ok(None)
            }
        }
    }

    /// Store `value` under a synthesized key and return that key.
    ///
    /// The key is the successor of the last key `append` produced (or
    /// [`Ordinal::FIRST`] on a fresh or cleared map), skipping keys already
    /// present, so `append` always adds a new entry.
    pub fn append(&mut self, value: V) -> Result<K>
    where
        K: Ordinal + Clone,
    {
        let _g = self.reentrancy.enter("append");
        let mut key = match &self.last_key {
            Some(k) => k.successor().ok_or(Error::KeySpaceExhausted)?,
            None => K::FIRST,
        };
        while self.find_key(&key).is_some() {
            key = key.successor().ok_or(Error::KeySpaceExhausted)?;
        }
        let key_hash = hash_of(&self.hasher, &key);
        let value_hash = hash_of(&self.hasher, &value);
        self.core
            .push(Entry::new(key.clone(), key_hash, value, value_hash))?;
        self.last_key = Some(key.clone());
        Ok(key)
    }

    /// Remove the entry stored under `key`. Same as
    /// [`swap_remove_at`](Self::swap_remove_at).
    pub fn remove_at<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.swap_remove_at(key)
    }

    /// Remove the entry stored under `key`, moving the last entry into its
    /// position. O(1) average.
    pub fn swap_remove_at<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("swap_remove_at");
        let slot = self.find_key(key)?;
        Some(self.core.swap_remove(slot))
    }

    /// Remove the entry stored under `key`, shifting later entries down to
    /// keep insertion order. O(n).
    pub fn shift_remove_at<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("shift_remove_at");
        let slot = self.find_key(key)?;
        Some(self.core.shift_remove(slot))
    }

    /// Remove the entry [`index_of`](Self::index_of) would report for
    /// `value`. Same as [`swap_remove`](Self::swap_remove).
    pub fn remove<Q>(&mut self, value: &Q) -> Option<(K, V)>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.swap_remove(value)
    }

    pub fn swap_remove<Q>(&mut self, value: &Q) -> Option<(K, V)>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("swap_remove");
        let slot = self.find_value(value, Direction::Forward)?;
        Some(self.core.swap_remove(slot))
    }

    pub fn shift_remove<Q>(&mut self, value: &Q) -> Option<(K, V)>
    where
        V: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter("shift_remove");
        let slot = self.find_value(value, Direction::Forward)?;
        Some(self.core.shift_remove(slot))
    }

    /// Grow the entry store, with a full rehash, so that it holds at least
    /// `capacity` entries. Does nothing when it already does.
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        let _g = self.reentrancy.enter("ensure_capacity");
        self.core.reserve(capacity)
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        self.core.assert_invariants();
    }
}

impl<K, V, S> Clone for DualIndexMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            core: self.core.clone(),
            last_key: self.last_key.clone(),
            reentrancy: DebugReentrancy::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for DualIndexMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, Q, S> Index<&Q> for DualIndexMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    V: Hash + Eq,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if `key` is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(v) => v,
            None => panic!("{}", Error::KeyNotFound),
        }
    }
}

impl<K, V, S> Extend<(K, V)> for DualIndexMap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher,
{
    /// # Panics
    ///
    /// Panics if the map would grow past [`MAX_CAPACITY`].
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        // Duplicate keys are likely when the map already has entries, so only
        // half the hint is reserved then. A hint past MAX_CAPACITY is ignored
        // and growth happens on demand.
        let (lower, _) = iter.size_hint();
        let hint = if self.is_empty() { lower } else { lower / 2 + lower % 2 };
        let wanted = self.len().saturating_add(hint);
        if wanted <= MAX_CAPACITY {
            if let Err(e) = self.ensure_capacity(wanted) {
                panic!("{e}");
            }
        }
        for (k, v) in iter {
            if let Err(e) = self.insert(k, v) {
                panic!("{e}");
            }
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for DualIndexMap<K, V, S>
where
    K: Hash + Eq,
    V: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S> IntoIterator for &'a DualIndexMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for DualIndexMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.core.into_entries())
    }
}
