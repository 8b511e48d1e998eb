//! Bucket headers and the surgery that threads entries onto hash chains.
//!
//! Every live entry sits on exactly two doubly linked chains: the key chain
//! of bucket `key_hash % bucket_count` and the value chain of bucket
//! `value_hash % bucket_count`. Both chains are threaded through the same
//! dense entry store using slot indices, so all functions here take the
//! store and the bucket array for one chain as separate slices.

use crate::entry::{Entry, HashValue, Links, Slot};
use crate::iter::Direction;

/// Head and tail of one hash chain. An empty bucket has both ends `None`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Bucket {
    pub(crate) first: Option<Slot>,
    pub(crate) last: Option<Slot>,
}

impl Bucket {
    pub(crate) const EMPTY: Bucket = Bucket {
        first: None,
        last: None,
    };

    #[inline]
    fn end(&self, dir: Direction) -> Option<Slot> {
        match dir {
            Direction::Forward => self.first,
            Direction::Backward => self.last,
        }
    }

    #[inline]
    fn shift_past(&mut self, removed: usize) {
        self.first = self.first.map(|s| s.shifted_past(removed));
        self.last = self.last.map(|s| s.shifted_past(removed));
    }
}

/// Selects which of the two independent chains an operation works on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Chain {
    Key = 0,
    Value = 1,
}

impl Chain {
    pub(crate) const BOTH: [Chain; 2] = [Chain::Key, Chain::Value];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub(crate) fn hash<K, V>(self, e: &Entry<K, V>) -> HashValue {
        match self {
            Chain::Key => e.key_hash,
            Chain::Value => e.value_hash,
        }
    }

    #[inline]
    pub(crate) fn links<K, V>(self, e: &Entry<K, V>) -> &Links {
        match self {
            Chain::Key => &e.key_links,
            Chain::Value => &e.value_links,
        }
    }

    #[inline]
    pub(crate) fn links_mut<K, V>(self, e: &mut Entry<K, V>) -> &mut Links {
        match self {
            Chain::Key => &mut e.key_links,
            Chain::Value => &mut e.value_links,
        }
    }
}

/// Append `slot` at the tail of the bucket its cached hash addresses.
pub(crate) fn push_tail<K, V>(
    entries: &mut [Entry<K, V>],
    buckets: &mut [Bucket],
    chain: Chain,
    slot: Slot,
) {
    let b = chain.hash(&entries[slot.get()]).bucket(buckets.len());
    let bucket = &mut buckets[b];
    let tail = bucket.last;
    *chain.links_mut(&mut entries[slot.get()]) = Links {
        prev: tail,
        next: None,
    };
    match tail {
        Some(t) => chain.links_mut(&mut entries[t.get()]).next = Some(slot),
        None => bucket.first = Some(slot),
    }
    bucket.last = Some(slot);
}

/// Detach `slot` from its chain, rewriting its neighbours or the bucket
/// header when it was a chain end.
pub(crate) fn unlink<K, V>(
    entries: &mut [Entry<K, V>],
    buckets: &mut [Bucket],
    chain: Chain,
    slot: Slot,
) {
    let Links { prev, next } = *chain.links(&entries[slot.get()]);
    let b = chain.hash(&entries[slot.get()]).bucket(buckets.len());
    match prev {
        Some(p) => chain.links_mut(&mut entries[p.get()]).next = next,
        None => buckets[b].first = next,
    }
    match next {
        Some(n) => chain.links_mut(&mut entries[n.get()]).prev = prev,
        None => buckets[b].last = prev,
    }
    *chain.links_mut(&mut entries[slot.get()]) = Links::DETACHED;
}

/// Re-point everything that referenced `from` at `to`, after the entry
/// formerly stored at `from` was moved to `to`. The moved entry's own links
/// are still valid since none of its neighbours moved.
pub(crate) fn relocate<K, V>(
    entries: &mut [Entry<K, V>],
    buckets: &mut [Bucket],
    chain: Chain,
    from: Slot,
    to: Slot,
) {
    let Links { prev, next } = *chain.links(&entries[to.get()]);
    let b = chain.hash(&entries[to.get()]).bucket(buckets.len());
    match prev {
        Some(p) => {
            let links = chain.links_mut(&mut entries[p.get()]);
            debug_assert_eq!(links.next, Some(from));
            links.next = Some(to);
        }
        None => {
            debug_assert_eq!(buckets[b].first, Some(from));
            buckets[b].first = Some(to);
        }
    }
    match next {
        Some(n) => {
            let links = chain.links_mut(&mut entries[n.get()]);
            debug_assert_eq!(links.prev, Some(from));
            links.prev = Some(to);
        }
        None => {
            debug_assert_eq!(buckets[b].last, Some(from));
            buckets[b].last = Some(to);
        }
    }
}

/// Rewrite every link and header of one chain after the entry at `removed`
/// was compacted out of the store.
pub(crate) fn shift_past<K, V>(
    entries: &mut [Entry<K, V>],
    buckets: &mut [Bucket],
    chain: Chain,
    removed: usize,
) {
    for e in entries.iter_mut() {
        chain.links_mut(e).shift_past(removed);
    }
    for bucket in buckets.iter_mut() {
        bucket.shift_past(removed);
    }
}

/// Walk a bucket's chain from either end.
pub(crate) fn walk<'a, K, V>(
    entries: &'a [Entry<K, V>],
    bucket: &Bucket,
    chain: Chain,
    dir: Direction,
) -> impl Iterator<Item = Slot> + 'a {
    core::iter::successors(bucket.end(dir), move |s| {
        let links = chain.links(&entries[s.get()]);
        match dir {
            Direction::Forward => links.next,
            Direction::Backward => links.prev,
        }
    })
}
