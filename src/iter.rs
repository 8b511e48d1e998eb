//! Ordered iteration over a `DualIndexMap`.
//!
//! Iteration ignores the hash chains and scans the entry store positionally.
//! The borrowing iterators hold `&DualIndexMap`, so the map cannot change
//! under them. A [`Cursor`] holds no borrow between steps; it snapshots the
//! map's generation instead and fails fast once the map has been mutated.

use crate::dual_index_map::DualIndexMap;
use crate::entry::Entry;
use crate::error::{Error, Result};
use core::iter::FusedIterator;
use core::slice;

/// Scan direction of a [`Cursor`] or a chain walk.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// From the first inserted entry to the last.
    Forward,
    /// From the last inserted entry to the first.
    Backward,
}

macro_rules! entry_iterator {
    ($name:ident, $item:ty, |$e:ident| $project:expr) => {
        impl<'a, K, V> Iterator for $name<'a, K, V> {
            type Item = $item;

            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.inner.next().map(|$e| $project)
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }

            #[inline]
            fn nth(&mut self, n: usize) -> Option<Self::Item> {
                self.inner.nth(n).map(|$e| $project)
            }
        }

        impl<K, V> DoubleEndedIterator for $name<'_, K, V> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                self.inner.next_back().map(|$e| $project)
            }
        }

        impl<K, V> ExactSizeIterator for $name<'_, K, V> {
            #[inline]
            fn len(&self) -> usize {
                self.inner.len()
            }
        }

        impl<K, V> FusedIterator for $name<'_, K, V> {}

        impl<K, V> Clone for $name<'_, K, V> {
            fn clone(&self) -> Self {
                Self {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<'a, K, V> $name<'a, K, V> {
            pub(crate) fn new(entries: &'a [Entry<K, V>]) -> Self {
                Self {
                    inner: entries.iter(),
                }
            }
        }
    };
}

/// Borrowing iterator over `(key, value)` pairs in positional order.
pub struct Iter<'a, K, V> {
    inner: slice::Iter<'a, Entry<K, V>>,
}
entry_iterator!(Iter, (&'a K, &'a V), |e| (&e.key, &e.value));

/// Borrowing iterator over keys in positional order.
pub struct Keys<'a, K, V> {
    inner: slice::Iter<'a, Entry<K, V>>,
}
entry_iterator!(Keys, &'a K, |e| &e.key);

/// Borrowing iterator over values in positional order.
pub struct Values<'a, K, V> {
    inner: slice::Iter<'a, Entry<K, V>>,
}
entry_iterator!(Values, &'a V, |e| &e.value);

/// Owning iterator over `(key, value)` pairs in positional order.
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<Entry<K, V>>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(entries: Vec<Entry<K, V>>) -> Self {
        Self {
            inner: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Entry::into_pair)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Entry::into_pair)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    #[inline]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

/// Detached, restartable scan over a map's entries.
///
/// A cursor does not borrow the map between steps, so the map may be mutated
/// while a scan is in progress. Every step compares the generation captured
/// at start with the map's current one; after any structural mutation the
/// next step yields [`Error::ConcurrentModification`] once and the cursor is
/// exhausted from then on. [`Cursor::reset`] starts a fresh scan.
///
/// A cursor must only be used with the map that created it.
#[derive(Clone, Debug)]
pub struct Cursor {
    direction: Direction,
    generation: u64,
    front: usize,
    back: usize,
    aborted: bool,
}

impl Cursor {
    pub(crate) fn new(direction: Direction, generation: u64, len: usize) -> Self {
        Self {
            direction,
            generation,
            front: 0,
            back: len,
            aborted: false,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Entries left to visit, assuming the map is not mutated.
    pub fn remaining(&self) -> usize {
        if self.aborted {
            0
        } else {
            self.back - self.front
        }
    }

    /// Restart the scan against the map's current state.
    pub fn reset<K, V, S>(&mut self, map: &DualIndexMap<K, V, S>) {
        *self = Cursor::new(self.direction, map.generation(), map.len());
    }

    fn advance<K, V, S>(&mut self, map: &DualIndexMap<K, V, S>) -> Option<Result<usize>> {
        if self.aborted {
            return None;
        }
        let found = map.generation();
        if found != self.generation {
            self.aborted = true;
            return Some(Err(Error::ConcurrentModification {
                expected: self.generation,
                found,
            }));
        }
        if self.front == self.back {
            return None;
        }
        let index = match self.direction {
            Direction::Forward => {
                self.front += 1;
                self.front - 1
            }
            Direction::Backward => {
                self.back -= 1;
                self.back
            }
        };
        Some(Ok(index))
    }

    /// Next entry, or the mutation error. A position past the end of `map`
    /// only happens when the cursor came from another map; the scan ends.
    fn step<'m, K, V, S>(
        &mut self,
        map: &'m DualIndexMap<K, V, S>,
    ) -> Option<Result<&'m Entry<K, V>>> {
        match self.advance(map)? {
            Ok(i) => match map.entries().get(i) {
                Some(e) => Some(Ok(e)),
                None => {
                    self.aborted = true;
                    None
                }
            },
            Err(e) => Some(Err(e)),
        }
    }

    /// Next `(key, value)` pair, or the mutation error.
    pub fn next_pair<'m, K, V, S>(
        &mut self,
        map: &'m DualIndexMap<K, V, S>,
    ) -> Option<Result<(&'m K, &'m V)>> {
        self.step(map).map(|r| r.map(|e| (&e.key, &e.value)))
    }

    /// Next key, or the mutation error.
    pub fn next_key<'m, K, V, S>(
        &mut self,
        map: &'m DualIndexMap<K, V, S>,
    ) -> Option<Result<&'m K>> {
        self.step(map).map(|r| r.map(|e| &e.key))
    }

    /// Next value, or the mutation error.
    pub fn next_value<'m, K, V, S>(
        &mut self,
        map: &'m DualIndexMap<K, V, S>,
    ) -> Option<Result<&'m V>> {
        self.step(map).map(|r| r.map(|e| &e.value))
    }
}
