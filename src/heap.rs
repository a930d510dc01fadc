//! Sequence heap: the hierarchical queue orchestrator
//!
//! Composes one fixed-capacity insertion buffer, a small top output cache,
//! and a stack of loser-tree merge levels each feeding a per-level output
//! cache. New elements land in the insertion buffer; a full buffer is
//! sorted and pushed into level 0 as one segment, and levels that run out
//! of segment slots merge their entire content into a single run that is
//! promoted one level up. Extraction is served from whichever of the two
//! fronts (insertion buffer, top cache) holds the smaller key, so the
//! global minimum is always one comparison away.
//!
//! The point of the layering is cache residency: the hot working set is the
//! insertion buffer plus the caches, a few kilobytes, while the bulk of the
//! queue sits in long sorted runs that are only streamed through during
//! batched merges. Average cost per operation is
//! O(log(N / insertion_bandwidth)) comparisons, amortized over the batches.
//!
//! # References
//!
//! - Sanders, P. (2000). "Fast Priority Queues for Cached Memory."
//!   *ACM Journal of Experimental Algorithmics*, 5.
//!   [ACM DL](https://dl.acm.org/doi/10.1145/351827.384249)
//! - Knuth, D. E. *The Art of Computer Programming*, vol. 3, §5.4.1
//!   (multiway merging with tournaments of losers).
//!
//! # Example
//!
//! ```rust
//! use sequence_heap::SequenceHeap;
//!
//! let mut heap: SequenceHeap<i64, &str> = SequenceHeap::new();
//! heap.insert(5, "five");
//! heap.insert(3, "three");
//!
//! assert_eq!(heap.peek_min(), (&3, &"three"));
//! assert_eq!(heap.delete_min(), (3, "three"));
//! assert_eq!(heap.pop(), Some((5, "five")));
//! assert_eq!(heap.pop(), None);
//! ```

use std::fmt;

use crate::bounds::KeyBounds;
use crate::element::{merge_runs, Element};
use crate::insertion::InsertionHeap;
use crate::loser_tree::LoserTree;

/// Number of elements the top output cache holds. Small enough to stay in
/// L1, large enough to amortize a refill across many extractions.
pub(crate) const TOP_BANDWIDTH: usize = 32;

/// Construction-time sizing of a [`SequenceHeap`].
///
/// These four knobs jointly bound the queue's capacity at roughly
/// `min(insertion_bandwidth, level_bandwidth) * max_arity.pow(levels)`;
/// exceeding it surfaces as [`CapacityError`]. The defaults match the
/// classic tuning for a few megabytes of cache: bandwidth 512, arity 64,
/// four levels. Keeping the two bandwidths equal gets the most out of the
/// level stack, since every flushed run occupies a whole segment slot no
/// matter how short it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Size of the insertion buffer before a forced flush to level 0.
    pub insertion_bandwidth: usize,
    /// Size of each per-level output cache.
    pub level_bandwidth: usize,
    /// Upper bound on simultaneous segments per level; a power of two.
    pub max_arity: usize,
    /// Number of stacked merge levels.
    pub levels: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            insertion_bandwidth: 512,
            level_bandwidth: 512,
            max_arity: 64,
            levels: 4,
        }
    }
}

impl Config {
    /// Approximate maximum number of elements the configuration can hold
    /// before promotion cascades past the last level. Saturates on overflow.
    ///
    /// Segments entering level 0 are insertion-buffer flushes, so the
    /// smaller of the two bandwidths governs how many elements a segment
    /// slot is worth.
    pub fn capacity_hint(&self) -> usize {
        let mut cap = self.level_bandwidth.min(self.insertion_bandwidth);
        for _ in 0..self.levels {
            cap = cap.saturating_mul(self.max_arity);
        }
        cap
    }

    fn validate(&self) {
        assert!(self.insertion_bandwidth > 0, "insertion_bandwidth must be nonzero");
        assert!(self.level_bandwidth > 0, "level_bandwidth must be nonzero");
        assert!(
            self.max_arity >= 2 && self.max_arity.is_power_of_two(),
            "max_arity must be a power of two >= 2"
        );
        assert!(self.levels > 0, "at least one merge level is required");
    }
}

/// The queue outgrew its configured level stack.
///
/// Promotion cascaded past the last configured level: the instance was
/// undersized for the workload. This is fatal for the attempted insertion
/// (nothing is lost or partially moved), not a transient condition; build a
/// bigger instance via [`Config`] to proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    levels: usize,
    capacity_hint: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sequence heap capacity exhausted: promotion cascaded past all {} levels (~{} elements)",
            self.levels, self.capacity_hint
        )
    }
}

impl std::error::Error for CapacityError {}

/// An ascending run being consumed front to back. Exhausted when the cursor
/// reaches the end; its front key then reads as the supremum so cache fronts
/// can be compared without emptiness checks.
#[derive(Debug, Clone)]
struct OutputCache<K, V> {
    data: Vec<Element<K, V>>,
    cursor: usize,
}

impl<K: KeyBounds, V: Clone + Default> OutputCache<K, V> {
    fn exhausted() -> Self {
        OutputCache {
            data: Vec::new(),
            cursor: 0,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.cursor == self.data.len()
    }

    #[inline]
    fn front_key(&self) -> K {
        match self.data.get(self.cursor) {
            Some(e) => e.key,
            None => K::supremum(),
        }
    }

    #[inline]
    fn front(&self) -> &Element<K, V> {
        &self.data[self.cursor]
    }

    #[inline]
    fn pop_front(&mut self) -> Element<K, V> {
        let e = self.data[self.cursor].clone();
        self.cursor += 1;
        e
    }

    /// Replaces the cache's content with a fresh ascending run.
    fn reload(&mut self, run: Vec<Element<K, V>>) {
        self.data = run;
        self.cursor = 0;
    }

    /// Removes the consumed prefix so new elements can be appended after the
    /// remainder.
    fn compact(&mut self) {
        self.data.drain(..self.cursor);
        self.cursor = 0;
    }

    /// Moves the unconsumed remainder out, leaving the cache exhausted.
    fn take_remaining(&mut self) -> Vec<Element<K, V>> {
        let rest = self.data.split_off(self.cursor);
        self.data.clear();
        self.cursor = 0;
        rest
    }
}

/// Cache-efficient hierarchical priority queue over (key, value) pairs.
///
/// Keys are totally ordered and must lie strictly between the type's
/// [`KeyBounds`] sentinels; values are opaque payloads copied by value.
/// Equal keys carry no ordering guarantee (the queue is not stable).
///
/// Single-threaded and non-reentrant; wrap the instance externally if
/// concurrent access is needed.
///
/// # Contract violations
///
/// `peek_min`/`delete_min` on an empty queue and inserting a sentinel key
/// panic. Exceeding the configured capacity panics in [`insert`](Self::insert)
/// and is reported as [`CapacityError`] by [`try_insert`](Self::try_insert).
#[derive(Debug, Clone)]
pub struct SequenceHeap<K: KeyBounds, V: Clone + Default> {
    insert_heap: InsertionHeap<K, V>,
    levels: Vec<LoserTree<K, V>>,
    level_caches: Vec<OutputCache<K, V>>,
    top_cache: OutputCache<K, V>,
    /// Elements resident in the levels and level caches, i.e. everything
    /// except the insertion buffer and the top cache.
    size_below: usize,
    config: Config,
}

impl<K: KeyBounds, V: Clone + Default> SequenceHeap<K, V> {
    /// Creates an empty queue with the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an empty queue sized by `config`.
    pub fn with_config(config: Config) -> Self {
        config.validate();
        SequenceHeap {
            insert_heap: InsertionHeap::new(config.insertion_bandwidth),
            levels: (0..config.levels)
                .map(|_| LoserTree::new(config.max_arity))
                .collect(),
            level_caches: (0..config.levels).map(|_| OutputCache::exhausted()).collect(),
            top_cache: OutputCache::exhausted(),
            size_below: 0,
            config,
        }
    }

    /// The configuration this queue was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of elements currently in the queue.
    pub fn len(&self) -> usize {
        self.insert_heap.len() + self.top_cache.remaining() + self.size_below
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The minimum element. Contract: queue non-empty.
    ///
    /// Ties between the two fronts favor the top cache, matching the
    /// extraction policy.
    pub fn peek_min(&self) -> (&K, &V) {
        assert!(!self.is_empty(), "peek_min on an empty queue");
        let cached = self.top_cache.front_key();
        let buffered = self.insert_heap.min_key();
        if buffered >= cached {
            let e = self.top_cache.front();
            (&e.key, &e.value)
        } else {
            self.insert_heap.peek_min()
        }
    }

    /// Removes and returns the minimum element. Contract: queue non-empty.
    pub fn delete_min(&mut self) -> (K, V) {
        assert!(!self.is_empty(), "delete_min on an empty queue");
        let cached = self.top_cache.front_key();
        let buffered = self.insert_heap.min_key();
        if buffered >= cached {
            let e = self.top_cache.pop_front();
            if self.top_cache.is_exhausted() {
                self.refill_top_cache();
            }
            (e.key, e.value)
        } else {
            let e = self.insert_heap.delete_min();
            (e.key, e.value)
        }
    }

    /// Removes and returns the minimum element, or `None` if the queue is
    /// empty.
    pub fn pop(&mut self) -> Option<(K, V)> {
        if self.is_empty() {
            None
        } else {
            Some(self.delete_min())
        }
    }

    /// Inserts an element. Contract: `infimum < key < supremum`.
    ///
    /// # Panics
    ///
    /// Panics with the [`CapacityError`] message if the flush this insert
    /// triggers cascades past the last configured level.
    pub fn insert(&mut self, key: K, value: V) {
        if let Err(e) = self.try_insert(key, value) {
            panic!("{e}");
        }
    }

    /// Inserts an element, reporting capacity exhaustion instead of
    /// panicking. On `Err` the queue is unchanged.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), CapacityError> {
        if self.insert_heap.is_full() {
            self.flush_insertion_buffer()?;
        }
        self.insert_heap.insert(key, value);
        Ok(())
    }

    /// Drains the insertion buffer into one ascending run and pushes it into
    /// level 0 as a new segment.
    ///
    /// The fresh run may undercut keys already materialized at the fronts,
    /// so it is first merged with the remainders of the top cache and of
    /// level 0's cache; the smallest elements stay at the fronts and only
    /// the tail goes down as the segment. Without this re-merge a small key
    /// flushed behind a populated top cache would surface out of order.
    fn flush_insertion_buffer(&mut self) -> Result<(), CapacityError> {
        self.make_space_available(0)?;

        let mut fresh = Vec::with_capacity(self.insert_heap.len());
        self.insert_heap.drain_sorted(&mut fresh);
        let flushed = fresh.len();

        let top_rest = self.top_cache.take_remaining();
        let sz_top = top_rest.len();
        let mut front = top_rest;
        front.extend(self.level_caches[0].take_remaining());
        let sz_cache = front.len() - sz_top;

        // `front` is one sorted run: a top-cache refill leaves every top
        // element <= every level-cache element
        let mut merged = merge_runs(front, fresh);
        let tail = merged.split_off(sz_top + sz_cache);
        let cache_part = merged.split_off(sz_top);
        self.top_cache.reload(merged);
        self.level_caches[0].reload(cache_part);

        debug_assert_eq!(tail.len(), flushed);
        self.size_below += tail.len();
        self.levels[0].insert_segment(tail);

        // a flush below an exhausted top cache must surface immediately,
        // otherwise the fronts would read empty while elements sit below
        if self.top_cache.is_exhausted() {
            self.refill_top_cache();
        }
        Ok(())
    }

    /// Ensures `level` can accept one more segment, promoting whole levels
    /// upward as needed. Recurses before merging, so a capacity failure
    /// surfaces with nothing moved.
    fn make_space_available(&mut self, level: usize) -> Result<(), CapacityError> {
        if level >= self.config.levels {
            return Err(CapacityError {
                levels: self.config.levels,
                capacity_hint: self.config.capacity_hint(),
            });
        }
        if self.levels[level].has_space_for_segment() {
            return Ok(());
        }
        self.make_space_available(level + 1)?;

        // merge this level's entire remaining content into one run and
        // promote it as a single segment of the next level
        let remaining = self.levels[level].len();
        let mut run = Vec::with_capacity(remaining);
        self.levels[level].multi_merge(&mut run, remaining);
        if !run.is_empty() {
            // the run may undercut what the destination's cache still
            // holds; re-merge so the cache keeps the smallest elements and
            // its front stays the destination level's minimum
            let kept = self.level_caches[level + 1].take_remaining();
            let keep = kept.len();
            let mut merged = merge_runs(kept, run);
            let tail = merged.split_off(keep);
            self.level_caches[level + 1].reload(merged);
            self.levels[level + 1].insert_segment(tail);
        }
        Ok(())
    }

    /// Pulls the globally smallest batch out of the level caches into the
    /// top cache.
    ///
    /// Level caches holding less than a top batch are topped up from their
    /// level first; the batch is then a k-way merge across the cache fronts.
    /// A cache that drains mid-batch while its level still holds elements
    /// is topped up again on the spot, so a non-empty level always has its
    /// true minimum standing at a front. Leaves the top cache exhausted
    /// only when every source is empty.
    fn refill_top_cache(&mut self) {
        for level in 0..self.config.levels {
            if self.level_caches[level].remaining() < TOP_BANDWIDTH
                && !self.levels[level].is_empty()
            {
                self.refill_level_cache(level);
            }
        }

        let batch = self.size_below.min(TOP_BANDWIDTH);
        let mut run = Vec::with_capacity(batch);
        for _ in 0..batch {
            let mut best = 0;
            let mut best_key = K::supremum();
            for (level, cache) in self.level_caches.iter().enumerate() {
                let front = cache.front_key();
                if front < best_key {
                    best_key = front;
                    best = level;
                }
            }
            run.push(self.level_caches[best].pop_front());
            if self.level_caches[best].is_exhausted() && !self.levels[best].is_empty() {
                self.refill_level_cache(best);
            }
        }
        self.size_below -= batch;
        self.top_cache.reload(run);
    }

    /// Tops up a level's output cache from the level's tournament merge.
    ///
    /// The consumed prefix is dropped, the remainder shifted to the front,
    /// and the cache refilled to its bandwidth (or to everything the level
    /// still holds). The level's elements are all >= the cache remainder,
    /// so appending keeps the run ascending.
    fn refill_level_cache(&mut self, level: usize) {
        let cache = &mut self.level_caches[level];
        let tree_len = self.levels[level].len();
        let buffered = cache.remaining();
        let pull = if tree_len + buffered >= self.config.level_bandwidth {
            self.config.level_bandwidth - buffered
        } else {
            tree_len
        };
        cache.compact();
        self.levels[level].multi_merge(&mut cache.data, pull);
    }
}

impl<K: KeyBounds, V: Clone + Default> Default for SequenceHeap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small enough to exercise flushes, cache refills, and promotions with
    /// two-digit element counts.
    fn tiny() -> Config {
        Config {
            insertion_bandwidth: 4,
            level_bandwidth: 8,
            max_arity: 4,
            levels: 3,
        }
    }

    #[test]
    fn test_concrete_scenario() {
        let mut heap: SequenceHeap<i64, i64> = SequenceHeap::new();
        for &k in &[5, 3, 8, 1, 9, 2] {
            heap.insert(k, k);
        }
        let drained: Vec<i64> = (0..6).map(|_| heap.delete_min().0).collect();
        assert_eq!(drained, vec![1, 2, 3, 5, 8, 9]);
        assert_eq!(heap.len(), 0);
    }

    #[test]
    fn test_flush_at_bandwidth_boundary() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(tiny());
        for k in 0..4 {
            heap.insert(k, k);
        }
        assert_eq!(heap.len(), 4);
        // the fifth insert forces the flush to level 0
        heap.insert(4, 4);
        assert_eq!(heap.len(), 5);
        for k in 0..5 {
            assert_eq!(heap.delete_min(), (k, k));
        }
        assert!(heap.is_empty());
    }

    #[test]
    fn test_small_key_inserted_after_flush() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(tiny());
        for k in 10..30 {
            heap.insert(k, k);
        }
        // drain a little so the top cache is mid-run, then undercut it
        assert_eq!(heap.delete_min().0, 10);
        assert_eq!(heap.delete_min().0, 11);
        for k in [1, 2, 3, 4, 5] {
            heap.insert(k, k);
        }
        let mut drained = Vec::new();
        while let Some((k, _)) = heap.pop() {
            drained.push(k);
        }
        let mut expected: Vec<i32> = (1..=5).chain(12..30).collect();
        expected.sort_unstable();
        assert_eq!(drained, expected);
    }

    #[test]
    fn test_interleaved_conservation() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(tiny());
        let mut inserted = 0usize;
        let mut removed = 0usize;
        for round in 0..50 {
            for k in 0..7 {
                heap.insert(round * 7 + k, 0);
                inserted += 1;
            }
            for _ in 0..5 {
                heap.delete_min();
                removed += 1;
            }
            assert_eq!(heap.len(), inserted - removed);
        }
        while heap.pop().is_some() {
            removed += 1;
        }
        assert_eq!(inserted, removed);
    }

    #[test]
    fn test_tie_handling() {
        let mut heap: SequenceHeap<i32, char> = SequenceHeap::new();
        heap.insert(4, 'a');
        heap.insert(4, 'b');
        heap.insert(4, 'c');
        let mut values: Vec<char> = (0..3)
            .map(|_| {
                let (k, v) = heap.delete_min();
                assert_eq!(k, 4);
                v
            })
            .collect();
        values.sort_unstable();
        assert_eq!(values, vec!['a', 'b', 'c']);
    }

    #[test]
    #[should_panic(expected = "empty queue")]
    fn test_peek_min_on_fresh_queue_panics() {
        let heap: SequenceHeap<i32, i32> = SequenceHeap::new();
        heap.peek_min();
    }

    #[test]
    #[should_panic(expected = "empty queue")]
    fn test_delete_min_after_drain_panics() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::new();
        heap.insert(1, 1);
        heap.delete_min();
        heap.delete_min();
    }

    #[test]
    #[should_panic(expected = "sentinel")]
    fn test_sentinel_key_rejected() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::new();
        heap.insert(i32::MIN, 0);
    }

    #[test]
    fn test_try_insert_capacity_exhaustion() {
        let config = Config {
            insertion_bandwidth: 2,
            level_bandwidth: 2,
            max_arity: 2,
            levels: 1,
        };
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(config);
        let mut stored = 0;
        let result = (0..1000).try_for_each(|k| {
            heap.try_insert(k, k).map(|_| {
                stored += 1;
            })
        });
        let err = result.unwrap_err();
        assert!(err.to_string().contains("capacity exhausted"));
        // nothing was lost: everything accepted so far still drains in order
        assert_eq!(heap.len(), stored);
        let mut last = i32::MIN;
        while let Some((k, _)) = heap.pop() {
            assert!(k >= last);
            last = k;
        }
    }

    #[test]
    fn test_capacity_hint() {
        // insertion bandwidth 4 is the governing constant, not the
        // level bandwidth of 8
        let config = tiny();
        assert_eq!(config.capacity_hint(), 4 * 4 * 4 * 4);
    }

    #[test]
    fn test_peek_matches_delete() {
        let mut heap: SequenceHeap<i32, i32> = SequenceHeap::with_config(tiny());
        for k in [44, 3, 17, 9, 61, 2, 90, 5, 23, 8] {
            heap.insert(k, k * 2);
        }
        while !heap.is_empty() {
            let (pk, pv) = {
                let (k, v) = heap.peek_min();
                (*k, *v)
            };
            assert_eq!(heap.delete_min(), (pk, pv));
        }
    }
}
