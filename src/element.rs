//! Key/value element stored by the sequence heap
//!
//! Elements are ordered strictly by key; the value is an opaque payload that
//! travels with its key and is copied by value as elements move between the
//! insertion buffer, segments, and caches.

use crate::bounds::KeyBounds;

/// A (key, value) pair.
///
/// `V: Default` is required because dead array slots still hold an element
/// (keyed with the supremum sentinel); the default value fills the payload of
/// those slots so no storage is ever uninitialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Element<K, V> {
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Element { key, value }
    }
}

impl<K: KeyBounds, V: Default> Element<K, V> {
    /// The element stored in dead slots: supremum key, default payload.
    #[inline]
    pub(crate) fn exhausted() -> Self {
        Element {
            key: K::supremum(),
            value: V::default(),
        }
    }

    /// The lower boundary slot of the insertion heap.
    #[inline]
    pub(crate) fn infimum() -> Self {
        Element {
            key: K::infimum(),
            value: V::default(),
        }
    }
}

/// Merge two ascending runs into one ascending run, consuming both.
///
/// Ties favor `a`, the already-materialized stream, so elements that were
/// visible at a front stay ahead of later arrivals with equal keys.
pub(crate) fn merge_runs<K: Ord, V>(a: Vec<Element<K, V>>, b: Vec<Element<K, V>>) -> Vec<Element<K, V>> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    loop {
        match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => {
                if x.key <= y.key {
                    out.push(a.next().unwrap());
                } else {
                    out.push(b.next().unwrap());
                }
            }
            (Some(_), None) => {
                out.extend(a);
                break;
            }
            (None, _) => {
                out.extend(b);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(keys: &[i32]) -> Vec<Element<i32, i32>> {
        keys.iter().map(|&k| Element::new(k, k * 10)).collect()
    }

    #[test]
    fn test_merge_runs_interleaved() {
        let merged = merge_runs(run(&[1, 4, 7]), run(&[2, 3, 8]));
        let keys: Vec<i32> = merged.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 7, 8]);
    }

    #[test]
    fn test_merge_runs_empty_sides() {
        assert_eq!(merge_runs(run(&[]), run(&[1, 2])).len(), 2);
        assert_eq!(merge_runs(run(&[1, 2]), run(&[])).len(), 2);
        assert!(merge_runs(run(&[]), run(&[])).is_empty());
    }

    #[test]
    fn test_merge_runs_values_follow_keys() {
        let merged = merge_runs(run(&[5]), run(&[3]));
        assert_eq!(merged[0], Element::new(3, 30));
        assert_eq!(merged[1], Element::new(5, 50));
    }
}
