//! Incrementable keys for [`DualIndexMap::append`](crate::DualIndexMap::append).

/// A key type `append` can synthesize: it has a first value and a checked
/// successor.
pub trait Ordinal: Sized {
    /// Key used by `append` on a map that has never stored an entry.
    const FIRST: Self;

    /// The next key, or `None` when `self` is the largest representable key.
    fn successor(&self) -> Option<Self>;
}

macro_rules! impl_ordinal {
    ($($t:ty),* $(,)?) => {
        $(
            impl Ordinal for $t {
                const FIRST: Self = 0;

                #[inline]
                fn successor(&self) -> Option<Self> {
                    self.checked_add(1)
                }
            }
        )*
    };
}

impl_ordinal!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
