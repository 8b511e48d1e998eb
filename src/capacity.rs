//! Prime-biased sizing for the entry store and the bucket arrays.

use crate::error::{Error, Result};

/// Entry-store size of a freshly constructed map.
pub const MIN_CAPACITY: usize = 3;

/// Largest supported entry count. Slots are stored as `u32`, and this bound
/// (itself prime) keeps every planned size addressable.
pub const MAX_CAPACITY: usize = i32::MAX as usize;

/// Smallest bucket count the planner aims for before clamping to the store.
const MIN_BUCKETS: usize = 5;

/// Sizes of one generation of the entry store and its two bucket arrays.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Layout {
    pub(crate) entries: usize,
    pub(crate) buckets: usize,
}

impl Layout {
    /// Plan a layout able to hold `count <= MAX_CAPACITY` entries.
    ///
    /// The store gets the smallest prime `>= count`; the buckets get the
    /// largest prime `<= max(5, count / 2)`, never more than the store.
    pub(crate) fn plan(count: usize) -> Layout {
        debug_assert!(count <= MAX_CAPACITY);
        let entries = next_prime(count.max(MIN_CAPACITY));
        let buckets = prev_prime((count / 2).max(MIN_BUCKETS)).min(entries);
        Layout { entries, buckets }
    }

    /// Like [`Layout::plan`], reporting counts past `MAX_CAPACITY` as an error.
    pub(crate) fn for_count(count: usize) -> Result<Layout> {
        if count > MAX_CAPACITY {
            return Err(Error::CapacityExceeded {
                requested: count,
                max: MAX_CAPACITY,
            });
        }
        Ok(Layout::plan(count))
    }
}

/// Entry count to plan for when an append finds the store full.
pub(crate) fn grow_target(len: usize) -> Result<usize> {
    if len >= MAX_CAPACITY {
        return Err(Error::CapacityExceeded {
            requested: len.saturating_add(1),
            max: MAX_CAPACITY,
        });
    }
    Ok(len.saturating_mul(2).clamp(len + 1, MAX_CAPACITY))
}

pub(crate) fn is_prime(n: usize) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut d = 5usize;
    while d * d <= n {
        if n % d == 0 || n % (d + 2) == 0 {
            return false;
        }
        d += 6;
    }
    true
}

/// Smallest prime `>= n`. Callers keep `n <= MAX_CAPACITY`, which is prime.
pub(crate) fn next_prime(n: usize) -> usize {
    let mut c = n.max(2);
    while !is_prime(c) {
        c += 1;
    }
    c
}

/// Largest prime `<= n`, for `n >= 2`.
pub(crate) fn prev_prime(n: usize) -> usize {
    debug_assert!(n >= 2);
    let mut c = n;
    while c > 2 && !is_prime(c) {
        c -= 1;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primes() {
        let small: Vec<usize> = (0..30).filter(|&n| is_prime(n)).collect();
        assert_eq!(small, [2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
        assert!(is_prime(MAX_CAPACITY));
        assert_eq!(next_prime(14), 17);
        assert_eq!(next_prime(17), 17);
        assert_eq!(prev_prime(16), 13);
        assert_eq!(prev_prime(5), 5);
    }

    /// Invariant: buckets never outnumber entry slots and both sizes are prime.
    #[test]
    fn layout_sizes() {
        assert_eq!(
            Layout::plan(0),
            Layout {
                entries: 3,
                buckets: 3
            }
        );
        assert_eq!(
            Layout::for_count(3).unwrap(),
            Layout {
                entries: 3,
                buckets: 3
            }
        );
        assert_eq!(
            Layout::for_count(6).unwrap(),
            Layout {
                entries: 7,
                buckets: 5
            }
        );
        assert_eq!(
            Layout::for_count(100).unwrap(),
            Layout {
                entries: 101,
                buckets: 47
            }
        );
        for n in 0..500 {
            let l = Layout::plan(n);
            assert!(l.entries >= n);
            assert!(l.buckets <= l.entries);
            assert!(is_prime(l.entries) && is_prime(l.buckets));
        }
    }

    #[test]
    fn growth_and_exhaustion() {
        assert_eq!(grow_target(3).unwrap(), 6);
        assert_eq!(grow_target(0).unwrap(), 1);
        assert_eq!(grow_target(MAX_CAPACITY - 1).unwrap(), MAX_CAPACITY);
        assert_eq!(
            grow_target(MAX_CAPACITY),
            Err(Error::CapacityExceeded {
                requested: MAX_CAPACITY + 1,
                max: MAX_CAPACITY
            })
        );
        assert!(matches!(
            Layout::for_count(MAX_CAPACITY + 1),
            Err(Error::CapacityExceeded { .. })
        ));
    }
}
