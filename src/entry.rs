//! Entry store records: typed slot handles, cached hashes and chain links.

use crate::capacity::MAX_CAPACITY;

/// Position of an entry in the dense entry store.
///
/// Slots are only valid until the next structural mutation; the store is
/// compacted on removal, so a slot never outlives the call that produced it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub(crate) struct Slot(u32);

impl Slot {
    #[inline]
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < MAX_CAPACITY, "slot {index} out of range");
        Slot(index as u32)
    }

    #[inline]
    pub(crate) fn get(self) -> usize {
        self.0 as usize
    }

    /// The slot this one occupies after the entry at `removed` is
    /// compacted out of the store.
    #[inline]
    pub(crate) fn shifted_past(self, removed: usize) -> Self {
        if self.get() > removed {
            Slot(self.0 - 1)
        } else {
            self
        }
    }
}

/// Cached hash of a key or a value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct HashValue(pub(crate) u64);

impl HashValue {
    /// Bucket addressed by this hash in an array of `bucket_count` headers.
    #[inline]
    pub(crate) fn bucket(self, bucket_count: usize) -> usize {
        debug_assert!(bucket_count > 0);
        (self.0 % bucket_count as u64) as usize
    }
}

/// One direction pair of chain pointers. `None` marks a chain end.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Links {
    pub(crate) prev: Option<Slot>,
    pub(crate) next: Option<Slot>,
}

impl Links {
    pub(crate) const DETACHED: Links = Links {
        prev: None,
        next: None,
    };

    #[inline]
    pub(crate) fn shift_past(&mut self, removed: usize) {
        self.prev = self.prev.map(|s| s.shifted_past(removed));
        self.next = self.next.map(|s| s.shifted_past(removed));
    }
}

/// A live key/value pair threaded onto both the key chain and the value chain.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) key_hash: HashValue,
    pub(crate) value_hash: HashValue,
    pub(crate) key_links: Links,
    pub(crate) value_links: Links,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, key_hash: HashValue, value: V, value_hash: HashValue) -> Self {
        Self {
            key,
            value,
            key_hash,
            value_hash,
            key_links: Links::DETACHED,
            value_links: Links::DETACHED,
        }
    }

    #[inline]
    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}
