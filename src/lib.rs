//! dual-index-map: an insertion-ordered map with O(1) average lookup both
//! by key and by value, built on manual open chaining.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an engine for index-addressable collections that answers
//!   "value for this key" and "key for this value" without a scan, and
//!   iterates in insertion order.
//! - Layers:
//!   - `entry` / `chain`: the dense entry store and the doubly linked hash
//!     chains threaded through it. Each entry carries cached key and value
//!     hashes plus two link pairs, one per chain.
//!   - `MapCore<K, V>`: owns the store and both bucket arrays, grows them
//!     with a full rehash and performs removal surgery. It never calls user
//!     `Hash`/`Eq`; callers pass hashes and matching closures.
//!   - `DualIndexMap<K, V, S>`: public API; hashes with `S`, compares with
//!     `Eq`, and guards every entry point against reentrancy.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync`. Mutation needs `&mut`, so a single
//!   writer is enforced by the borrow checker rather than a lock.
//! - No per-entry heap allocation: entries live in one `Vec`, chains use
//!   `u32` slot indices with `None` as the chain end.
//! - Keys are unique. Values may repeat; value queries walk the value chain
//!   and confirm every hash match with `Eq`.
//!
//! Sizing
//! - The entry store is sized to the smallest prime at or above the planned
//!   count, the bucket arrays to the largest prime at or below
//!   `max(5, count / 2)` (clamped to the store). A full store doubles the
//!   planned count and re-threads every entry by its cached hashes; `Hash`
//!   is never re-run on growth.
//! - Growing past [`MAX_CAPACITY`] entries fails with
//!   [`Error::CapacityExceeded`].
//!
//! Removal
//! - `swap_remove*` (also `remove` / `remove_at`) moves the last entry into
//!   the hole and re-points only that entry's neighbours: O(1), but the
//!   moved entry changes position.
//! - `shift_remove*` compacts the store to preserve order and rewrites
//!   every link above the hole: O(n).
//!
//! Iteration
//! - `iter`/`keys`/`values` borrow the map and are double-ended.
//! - [`Cursor`] does not borrow; it snapshots [`DualIndexMap::generation`]
//!   and fails with [`Error::ConcurrentModification`] on the first step
//!   after any structural mutation.
//!
//! Logging
//! - Resizes are reported through the `log` facade at `debug` level;
//!   clears and compactions at `trace` level.

mod capacity;
mod chain;
pub mod dual_index_map;
mod dual_index_map_proptest;
mod entry;
mod error;
pub mod iter;
mod map_core;
mod ordinal;
mod reentrancy;

// Public surface
pub use capacity::{MAX_CAPACITY, MIN_CAPACITY};
pub use dual_index_map::DualIndexMap;
pub use error::{Error, Result};
pub use iter::{Cursor, Direction};
pub use ordinal::Ordinal;
