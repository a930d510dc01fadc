//! Fixed-capacity insertion buffer
//!
//! A classic array-based binary min-heap with a fixed capacity, used by the
//! sequence heap to absorb insertions until a full buffer is flushed to the
//! first merge level as one sorted segment.
//!
//! The backing array holds `capacity + 2` elements: slot 0 carries the
//! infimum sentinel and slot `capacity + 1` the supremum sentinel, while dead
//! slots in between hold the supremum. With the guards in place the sift
//! loops never test array bounds; the sentinels absorb the one extra
//! comparison at each structural edge. Live elements occupy indices
//! `1..=len`.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `insert`       | O(log n)   |
//! | `peek_min`     | O(1)       |
//! | `delete_min`   | O(log n)   |
//! | `drain_sorted` | O(n log n) |
//! | `reset`        | O(n)       |

use crate::bounds::KeyBounds;
use crate::element::Element;

/// Bounded binary min-heap with sentinel-padded edges.
///
/// Created once with a fixed capacity and never resized. Insertion past
/// capacity or with a key outside the open sentinel range is a contract
/// violation and panics.
#[derive(Debug, Clone)]
pub struct InsertionHeap<K: KeyBounds, V: Clone + Default> {
    /// `capacity + 2` slots; `data[0]` = infimum, `data[capacity + 1]` = supremum.
    data: Vec<Element<K, V>>,
    len: usize,
    capacity: usize,
}

impl<K: KeyBounds, V: Clone + Default> InsertionHeap<K, V> {
    /// Creates an empty heap holding at most `capacity` elements.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "insertion heap needs a nonzero capacity");
        let mut data = vec![Element::exhausted(); capacity + 2];
        data[0] = Element::infimum();
        InsertionHeap {
            data,
            len: 0,
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Key at the root. Reads as the supremum sentinel when the heap is
    /// empty, so callers can compare fronts without an emptiness check.
    #[inline]
    pub fn min_key(&self) -> K {
        self.data[1].key
    }

    /// The minimum element. Contract: heap non-empty.
    #[inline]
    pub fn peek_min(&self) -> (&K, &V) {
        assert!(self.len > 0, "peek_min on an empty insertion heap");
        (&self.data[1].key, &self.data[1].value)
    }

    /// Inserts an element. Contract: heap not full, key strictly inside the
    /// sentinel range.
    ///
    /// Sift-up shifts parents down while they exceed the new key and drops
    /// the new element into the discovered hole, writing it exactly once.
    /// The infimum at slot 0 terminates the walk.
    pub fn insert(&mut self, key: K, value: V) {
        assert!(self.len < self.capacity, "insertion heap is full");
        assert!(K::in_range(&key), "key outside the open sentinel range");

        self.len += 1;
        let mut hole = self.len;
        let mut pred = hole >> 1;
        while self.data[pred].key > key {
            self.data[hole] = self.data[pred].clone();
            hole = pred;
            pred >>= 1;
        }
        self.data[hole] = Element::new(key, value);
    }

    /// Removes and returns the minimum element. Contract: heap non-empty.
    ///
    /// Walks the min-path down from the root (always the smaller child) past
    /// the logical end, then bubbles the former last element up into the
    /// vacated hole. Fewer comparisons than swap-based deletion because the
    /// downward walk never compares against the displaced element.
    pub fn delete_min(&mut self) -> Element<K, V> {
        assert!(self.len > 0, "delete_min on an empty insertion heap");
        let min = self.data[1].clone();

        let sz = self.len;
        let mut hole = 1;
        let mut succ = 2;
        while succ < sz {
            if self.data[succ + 1].key < self.data[succ].key {
                succ += 1;
            }
            self.data[hole] = self.data[succ].clone();
            hole = succ;
            succ <<= 1;
        }

        // bubble the former last element up from the hole; the infimum at
        // slot 0 (and the min at the root) terminate the walk
        let bubble = self.data[sz].clone();
        let mut pred = hole >> 1;
        while self.data[pred].key > bubble.key {
            self.data[hole] = self.data[pred].clone();
            hole = pred;
            pred >>= 1;
        }
        self.data[hole] = bubble;

        self.data[sz] = Element::exhausted();
        self.len = sz - 1;
        min
    }

    /// Empties the heap, appending its elements to `out` in ascending order.
    ///
    /// This is how a full insertion buffer becomes a sorted segment. Each
    /// round copies the root out and pulls the min-path up; the hole left at
    /// the bottom is simply marked dead, so no bubble-up is needed.
    pub fn drain_sorted(&mut self, out: &mut Vec<Element<K, V>>) {
        let sz = self.len;
        out.reserve(sz);
        for _ in 0..sz {
            out.push(self.data[1].clone());

            let mut hole = 1;
            let mut succ = 2;
            while succ <= sz {
                if self.data[succ + 1].key < self.data[succ].key {
                    succ += 1;
                }
                self.data[hole] = self.data[succ].clone();
                hole = succ;
                succ <<= 1;
            }
            self.data[hole] = Element::exhausted();
        }
        self.len = 0;
    }

    /// Clears the heap and restores every dead slot to the supremum sentinel.
    pub fn reset(&mut self) {
        for slot in &mut self.data[1..=self.capacity] {
            *slot = Element::exhausted();
        }
        self.len = 0;
    }
}
