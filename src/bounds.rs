//! Sentinel bounds for key types
//!
//! The sequence heap pads its internal arrays with two reserved keys: an
//! *infimum* that compares below every legal key and a *supremum* that
//! compares above every legal key. The supremum doubles as the "exhausted"
//! marker for slots, segments, and caches, which lets the hot loops replace
//! bounds checks with plain key comparisons.
//!
//! [`KeyBounds`] is how a key type hands those two values to the heap. It is
//! implemented for all primitive integer types using `MIN`/`MAX`, which means
//! `MIN` and `MAX` themselves are *not* legal keys — inserting one is a
//! contract violation.
//!
//! Floating point types are not supported directly because they are not
//! totally ordered (`f64: !Ord`); wrap them in a total-order newtype and
//! implement [`KeyBounds`] for that wrapper instead.

/// Provides the infimum and supremum sentinels for a key type.
///
/// Legal keys must satisfy `infimum() < key < supremum()`. The heap stores
/// the sentinels in boundary slots of its arrays, so a key equal to either
/// bound would corrupt the structure; insertion asserts the open range.
///
/// # Example
///
/// ```rust
/// use sequence_heap::KeyBounds;
///
/// assert!(i32::infimum() < 0 && 0 < i32::supremum());
/// assert_eq!(u16::supremum(), u16::MAX);
/// ```
pub trait KeyBounds: Copy + Ord {
    /// A value strictly below every legal key ("always smallest").
    fn infimum() -> Self;

    /// A value strictly above every legal key ("exhausted, always largest").
    fn supremum() -> Self;

    /// True if `key` lies strictly between the two sentinels.
    #[inline]
    fn in_range(key: &Self) -> bool {
        Self::infimum() < *key && *key < Self::supremum()
    }
}

macro_rules! impl_key_bounds_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl KeyBounds for $t {
                #[inline]
                fn infimum() -> Self {
                    <$t>::MIN
                }

                #[inline]
                fn supremum() -> Self {
                    <$t>::MAX
                }
            }
        )*
    };
}

impl_key_bounds_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
