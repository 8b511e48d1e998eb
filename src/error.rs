//! Error type shared by every fallible map operation.

use thiserror::Error;

/// Failures reported by [`DualIndexMap`](crate::DualIndexMap) and its
/// [`Cursor`](crate::Cursor).
///
/// Absence on `remove`/`contains`/`index_of` is not an error; those return
/// `Option` or `bool`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Keyed lookup on a key that is not present.
    #[error("key not found")]
    KeyNotFound,

    /// The map was structurally modified after a cursor was started.
    #[error(
        "collection changed during enumeration: cursor generation {expected}, map generation {found}"
    )]
    ConcurrentModification {
        /// Generation captured when the cursor started.
        expected: u64,
        /// Generation observed on the failing step.
        found: u64,
    },

    /// The entry store would have to grow past the addressable maximum.
    #[error("capacity exceeded: requested {requested} entries, maximum is {max}")]
    CapacityExceeded {
        /// Number of entries the operation needed.
        requested: usize,
        /// Largest supported entry count.
        max: usize,
    },

    /// `append` could not synthesize a key because the last key has no successor.
    #[error("key space exhausted: the last key has no successor")]
    KeySpaceExhausted,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages_name_the_failure() {
        assert_eq!(Error::KeyNotFound.to_string(), "key not found");
        let e = Error::ConcurrentModification {
            expected: 3,
            found: 4,
        };
        assert!(e.to_string().contains("changed during enumeration"));
        let e = Error::CapacityExceeded {
            requested: 10,
            max: 5,
        };
        assert_eq!(
            e.to_string(),
            "capacity exceeded: requested 10 entries, maximum is 5"
        );
    }
}
