//! Hasher-independent engine behind `DualIndexMap`.
//!
//! `MapCore` owns the entry store and both bucket arrays. None of its methods
//! hash anything or compare keys and values: callers hand in precomputed
//! hashes and matching closures, so user `Hash`/`Eq` code only ever runs
//! from the public layer.

use crate::capacity::{grow_target, Layout};
use crate::chain::{self, Bucket, Chain};
use crate::entry::{Entry, HashValue, Slot};
use crate::error::Result;
use crate::iter::Direction;

#[derive(Debug, Clone)]
pub(crate) struct MapCore<K, V> {
    /// Live entries in positional order; `len()` is the entry count.
    entries: Vec<Entry<K, V>>,
    /// Planned size of the entry store. Reaching it triggers a rebuild.
    capacity: usize,
    /// Key and value bucket arrays, indexed by `Chain::index`.
    buckets: [Vec<Bucket>; 2],
    generation: u64,
}

impl<K, V> MapCore<K, V> {
    pub(crate) fn with_layout(layout: Layout) -> Self {
        Self {
            entries: Vec::with_capacity(layout.entries),
            capacity: layout.entries,
            buckets: [
                vec![Bucket::EMPTY; layout.buckets],
                vec![Bucket::EMPTY; layout.buckets],
            ],
            generation: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets[0].len()
    }

    #[inline]
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<Entry<K, V>> {
        self.entries
    }

    /// First (or last, walking backward) entry on `chain` whose cached hash
    /// equals `hash` and that satisfies `is_match`.
    pub(crate) fn find<F>(
        &self,
        chain: Chain,
        hash: HashValue,
        dir: Direction,
        mut is_match: F,
    ) -> Option<Slot>
    where
        F: FnMut(&Entry<K, V>) -> bool,
    {
        let buckets = &self.buckets[chain.index()];
        let bucket = &buckets[hash.bucket(buckets.len())];
        chain::walk(&self.entries, bucket, chain, dir).find(|s| {
            let e = &self.entries[s.get()];
            chain.hash(e) == hash && is_match(e)
        })
    }

    /// Append `entry` at the end of the store and thread it onto both chains,
    /// growing first when the store is full.
    pub(crate) fn push(&mut self, entry: Entry<K, V>) -> Result<Slot> {
        if self.entries.len() == self.capacity {
            let target = grow_target(self.entries.len())?;
            self.rebuild(Layout::for_count(target)?);
        }
        let slot = Slot::new(self.entries.len());
        self.entries.push(entry);
        for chain in Chain::BOTH {
            let buckets = &mut self.buckets[chain.index()];
            chain::push_tail(&mut self.entries, buckets, chain, slot);
        }
        self.bump();
        Ok(slot)
    }

    /// Overwrite the value at `slot` and move the entry to the tail of the
    /// value chain its new hash addresses, whether or not the bucket changed.
    /// Returns the previous value.
    pub(crate) fn replace_value(&mut self, slot: Slot, value: V, value_hash: HashValue) -> V {
        let buckets = &mut self.buckets[Chain::Value.index()];
        chain::unlink(&mut self.entries, buckets, Chain::Value, slot);
        self.entries[slot.get()].value_hash = value_hash;
        chain::push_tail(&mut self.entries, buckets, Chain::Value, slot);
        self.bump();
        core::mem::replace(&mut self.entries[slot.get()].value, value)
    }

    /// Remove `slot` by moving the last entry into its place. O(1); the moved
    /// entry changes position.
    pub(crate) fn swap_remove(&mut self, slot: Slot) -> (K, V) {
        let last = Slot::new(self.entries.len() - 1);
        for chain in Chain::BOTH {
            let buckets = &mut self.buckets[chain.index()];
            chain::unlink(&mut self.entries, buckets, chain, slot);
        }
        let removed = self.entries.swap_remove(slot.get());
        if slot != last {
            for chain in Chain::BOTH {
                let buckets = &mut self.buckets[chain.index()];
                chain::relocate(&mut self.entries, buckets, chain, last, slot);
            }
        }
        self.bump();
        removed.into_pair()
    }

    /// Remove `slot` by shifting every later entry down one position. O(n);
    /// positional order is preserved.
    pub(crate) fn shift_remove(&mut self, slot: Slot) -> (K, V) {
        for chain in Chain::BOTH {
            let buckets = &mut self.buckets[chain.index()];
            chain::unlink(&mut self.entries, buckets, chain, slot);
        }
        let index = slot.get();
        let removed = self.entries.remove(index);
        if index < self.entries.len() {
            log::trace!(
                "compacting {} entries above slot {index}",
                self.entries.len() - index
            );
            for chain in Chain::BOTH {
                let buckets = &mut self.buckets[chain.index()];
                chain::shift_past(&mut self.entries, buckets, chain, index);
            }
        }
        self.bump();
        removed.into_pair()
    }

    /// Make room for at least `count` entries without a further rebuild.
    pub(crate) fn reserve(&mut self, count: usize) -> Result<()> {
        if count > self.capacity {
            self.rebuild(Layout::for_count(count)?);
        }
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        log::trace!("clearing {} entries", self.entries.len());
        self.entries.clear();
        for buckets in self.buckets.iter_mut() {
            buckets.fill(Bucket::EMPTY);
        }
        self.bump();
    }

    /// Replace the store and both bucket arrays with fresh ones sized by
    /// `layout`, re-threading every entry by its cached hashes.
    fn rebuild(&mut self, layout: Layout) {
        log::debug!(
            "resizing: {} entries, store {} -> {}, buckets {} -> {}",
            self.entries.len(),
            self.capacity,
            layout.entries,
            self.bucket_count(),
            layout.buckets
        );
        let mut entries = Vec::with_capacity(layout.entries);
        entries.extend(self.entries.drain(..));
        let mut buckets = [
            vec![Bucket::EMPTY; layout.buckets],
            vec![Bucket::EMPTY; layout.buckets],
        ];
        for i in 0..entries.len() {
            for chain in Chain::BOTH {
                chain::push_tail(&mut entries, &mut buckets[chain.index()], chain, Slot::new(i));
            }
        }
        self.entries = entries;
        self.buckets = buckets;
        self.capacity = layout.entries;
    }

    #[inline]
    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Panic unless every structural invariant holds: each live entry sits on
    /// exactly one key chain and one value chain, chains agree in both
    /// directions, and every chain member hashes to its bucket.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.entries.len() <= self.capacity);
        assert_eq!(self.buckets[0].len(), self.buckets[1].len());
        assert!(self.bucket_count() <= self.capacity);
        for chain in Chain::BOTH {
            let buckets = &self.buckets[chain.index()];
            let mut seen = vec![false; self.entries.len()];
            for (b, bucket) in buckets.iter().enumerate() {
                let mut prev = None;
                for s in chain::walk(&self.entries, bucket, chain, Direction::Forward) {
                    let e = &self.entries[s.get()];
                    assert!(!seen[s.get()], "{chain:?} chain visits slot {} twice", s.get());
                    seen[s.get()] = true;
                    assert_eq!(chain.hash(e).bucket(buckets.len()), b);
                    assert_eq!(chain.links(e).prev, prev);
                    prev = Some(s);
                }
                assert_eq!(bucket.last, prev, "{chain:?} bucket {b} tail mismatch");
                let mut backward: Vec<Slot> =
                    chain::walk(&self.entries, bucket, chain, Direction::Backward).collect();
                backward.reverse();
                let forward: Vec<Slot> =
                    chain::walk(&self.entries, bucket, chain, Direction::Forward).collect();
                assert_eq!(forward, backward);
            }
            assert!(seen.iter().all(|&v| v), "{chain:?} chains miss a live entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with(pairs: &[(u64, u64)]) -> MapCore<u64, u64> {
        let mut core = MapCore::with_layout(Layout::plan(0));
        for &(k, v) in pairs {
            core.push(Entry::new(k, HashValue(k), v, HashValue(v))).unwrap();
        }
        core
    }

    fn find_key(core: &MapCore<u64, u64>, k: u64) -> Option<Slot> {
        core.find(Chain::Key, HashValue(k), Direction::Forward, |e| e.key == k)
    }

    /// Invariant: growth rebuilds both chains and keeps positional order.
    #[test]
    fn push_grows_and_rehashes() {
        let pairs: Vec<(u64, u64)> = (0..50).map(|i| (i, i * 7)).collect();
        let core = core_with(&pairs);
        core.assert_invariants();
        assert_eq!(core.len(), 50);
        assert!(core.capacity() >= 50);
        let keys: Vec<u64> = core.entries().iter().map(|e| e.key).collect();
        assert_eq!(keys, (0..50).collect::<Vec<_>>());
        for i in 0..50 {
            assert_eq!(find_key(&core, i), Some(Slot::new(i as usize)));
        }
    }

    /// Invariant: swap removal relocates exactly the last entry and keeps both
    /// chains consistent.
    #[test]
    fn swap_remove_relocates_last() {
        let mut core = core_with(&[(0, 10), (1, 11), (2, 12), (3, 13)]);
        assert_eq!(core.swap_remove(Slot::new(1)), (1, 11));
        core.assert_invariants();
        assert_eq!(find_key(&core, 3), Some(Slot::new(1)));
        assert_eq!(find_key(&core, 1), None);
        let found = core.find(Chain::Value, HashValue(13), Direction::Forward, |e| {
            e.value == 13
        });
        assert_eq!(found, Some(Slot::new(1)));
    }

    /// Invariant: shift removal keeps order and no chain pointer goes stale.
    #[test]
    fn shift_remove_rewrites_links() {
        let mut core = core_with(&(0..20).map(|i| (i, 100 + i)).collect::<Vec<_>>());
        assert_eq!(core.shift_remove(Slot::new(4)), (4, 104));
        core.assert_invariants();
        let keys: Vec<u64> = core.entries().iter().map(|e| e.key).collect();
        let expected: Vec<u64> = (0..20).filter(|&k| k != 4).collect();
        assert_eq!(keys, expected);
        for k in 5..20 {
            assert_eq!(find_key(&core, k), Some(Slot::new(k as usize - 1)));
        }
    }

    /// Invariant: an overwrite whose hash lands in another bucket re-links the
    /// value chain.
    #[test]
    fn replace_value_moves_value_bucket() {
        let mut core = core_with(&[(0, 1), (1, 2)]);
        let slot = find_key(&core, 0).unwrap();
        // 1 % 3 and 5 % 3 address different buckets
        assert_eq!(core.replace_value(slot, 5, HashValue(5)), 1);
        core.assert_invariants();
        assert_eq!(
            core.find(Chain::Value, HashValue(5), Direction::Forward, |e| e.value == 5),
            Some(slot)
        );
        assert_eq!(
            core.find(Chain::Value, HashValue(1), Direction::Forward, |e| e.value == 1),
            None
        );
    }

    /// Invariant: an overwrite moves the entry to the value-chain tail even
    /// when the new hash addresses the same bucket.
    #[test]
    fn replace_value_same_bucket_moves_to_tail() {
        let mut core = core_with(&[(0, 1), (1, 1)]);
        let slot = find_key(&core, 0).unwrap();
        // 1 % 3 == 4 % 3
        assert_eq!(core.replace_value(slot, 4, HashValue(4)), 1);
        assert_eq!(core.replace_value(slot, 1, HashValue(1)), 4);
        core.assert_invariants();
        let first = core.find(Chain::Value, HashValue(1), Direction::Forward, |e| e.value == 1);
        let last = core.find(Chain::Value, HashValue(1), Direction::Backward, |e| e.value == 1);
        assert_eq!(first, Some(Slot::new(1)));
        assert_eq!(last, Some(slot));
    }

    /// Invariant: every structural mutation bumps the generation; reserve
    /// within capacity does not rebuild.
    #[test]
    fn generation_and_reserve() {
        let mut core = core_with(&[]);
        assert_eq!(core.generation(), 0);
        core.push(Entry::new(1, HashValue(1), 1, HashValue(1))).unwrap();
        assert_eq!(core.generation(), 1);
        core.reserve(2).unwrap();
        assert_eq!(core.capacity(), 3);
        core.reserve(40).unwrap();
        assert_eq!(core.capacity(), 41);
        assert_eq!(core.generation(), 1);
        core.assert_invariants();
        core.clear();
        assert_eq!(core.generation(), 2);
        assert_eq!(core.len(), 0);
        core.assert_invariants();
    }
}
