//! Loser-tree tournament over sorted segments
//!
//! One merge level of the sequence heap: a bounded set of segment slots,
//! each holding an ascending sorted run, and a tournament ("loser") tree
//! that yields the globally smallest head among all active segments in
//! O(log k) per extracted element.
//!
//! The structure follows Knuth's tournament tree (TAOCP vol. 3, §5.4.1):
//! every internal node records the *loser* of the comparison played there
//! and the winner travels up, so replaying a match after the winner's
//! segment advances touches only the leaf-to-root path.
//!
//! The arity `k` is always a power of two between 1 and `max_arity`. It
//! doubles when a segment arrives and no slot is free, and the tree is
//! compacted (live segments shifted left, `k` halved) when utilization
//! drops to half, keeping the tree depth near `log2(live segments)`. Both
//! resizes are amortized against the merge work that precedes them.
//!
//! Segment storage is an arena of `Vec`s indexed by slot; a free-slot stack
//! recycles indices as segments drain. An exhausted slot reads as the
//! supremum sentinel and loses every comparison from then on.

use smallvec::SmallVec;

use crate::bounds::KeyBounds;
use crate::element::Element;

/// An internal tournament node: the key of the local loser and the index of
/// the segment slot it came from. `entry[0]` holds the overall winner.
#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    index: usize,
}

/// One merge level: up to `max_arity` sorted segments behind a loser tree.
///
/// Not meaningful until constructed via [`LoserTree::new`]; `multi_merge`
/// for more elements than [`len`](LoserTree::len) or `insert_segment`
/// without [`has_space_for_segment`](LoserTree::has_space_for_segment) are
/// contract violations.
#[derive(Debug, Clone)]
pub struct LoserTree<K: KeyBounds, V: Clone + Default> {
    /// Internal nodes, `entry[0]` = winner info; only `entry[0..k]` are live.
    entry: Vec<Entry<K>>,
    /// Arena of segment runs, one per slot. Free slots hold an empty run.
    segment: Vec<Vec<Element<K, V>>>,
    /// Per-slot cursor: index of the next unconsumed element.
    current: Vec<usize>,
    /// Stack of free slot indices.
    free: SmallVec<[usize; 8]>,
    /// Total live elements across all segments.
    len: usize,
    /// Tree arity; invariant `k == 1 << log_k` and `k <= max_arity`.
    k: usize,
    log_k: u32,
    max_arity: usize,
}

impl<K: KeyBounds, V: Clone + Default> LoserTree<K, V> {
    /// Creates an empty level with arity 1: a single free slot whose head
    /// reads as the supremum, i.e. "no more data".
    pub fn new(max_arity: usize) -> Self {
        assert!(
            max_arity >= 2 && max_arity.is_power_of_two(),
            "max_arity must be a power of two >= 2"
        );
        let mut tree = LoserTree {
            entry: vec![
                Entry {
                    key: K::supremum(),
                    index: 0,
                };
                max_arity
            ],
            segment: vec![Vec::new(); max_arity],
            current: vec![0; max_arity],
            free: SmallVec::new(),
            len: 0,
            k: 1,
            log_k: 0,
            max_arity,
        };
        tree.free.push(0);
        tree.rebuild();
        tree
    }

    /// Total number of unconsumed elements across all segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The sentinel that marks this level as fully drained.
    #[inline]
    pub fn supremum(&self) -> K {
        K::supremum()
    }

    /// True if a new segment can be accepted: a slot is free or the arity
    /// can still double.
    #[inline]
    pub fn has_space_for_segment(&self) -> bool {
        self.k < self.max_arity || !self.free.is_empty()
    }

    /// Key at a slot's cursor; supremum once the slot is drained or free.
    #[inline]
    fn slot_key(&self, slot: usize) -> K {
        let cursor = self.current[slot];
        if cursor < self.segment[slot].len() {
            self.segment[slot][cursor].key
        } else {
            K::supremum()
        }
    }

    /// Adds a sorted run as a new segment.
    ///
    /// Contract: `run` is non-empty, ascending, and free of sentinel keys;
    /// the caller has checked [`has_space_for_segment`](Self::has_space_for_segment).
    /// Repairs only the tree path from the occupied leaf to the root.
    pub fn insert_segment(&mut self, run: Vec<Element<K, V>>) {
        assert!(!run.is_empty(), "cannot insert an empty segment");
        assert!(
            self.has_space_for_segment(),
            "no space for a segment; caller must check has_space_for_segment"
        );
        debug_assert!(K::in_range(&run[0].key) && K::in_range(&run[run.len() - 1].key));
        debug_assert!(run.windows(2).all(|w| w[0].key <= w[1].key));

        if self.free.is_empty() {
            self.double_k();
        }
        let slot = self.free.pop().unwrap();
        self.len += run.len();
        let head = run[0].key;
        self.current[slot] = 0;
        self.segment[slot] = run;

        self.update_path((slot + self.k) >> 1, head, slot);
    }

    /// Extracts the `count` smallest elements across all segments, appending
    /// them to `out` in ascending order.
    ///
    /// Contract: `count <= len()`. Segments that drain mid-merge release
    /// their storage and return their slot to the free pool; the batch may
    /// span any number of segment exhaustions. Afterwards the tree compacts
    /// if utilization fell to half.
    pub fn multi_merge(&mut self, out: &mut Vec<Element<K, V>>, count: usize) {
        assert!(count <= self.len, "multi_merge past the level's size");
        if count == 0 {
            return;
        }
        out.reserve(count);

        let mut winner = self.entry[0].index;
        let mut winner_key = self.entry[0].key;
        for _ in 0..count {
            let cursor = self.current[winner];
            out.push(self.segment[winner][cursor].clone());

            // advance the winning segment, releasing it when drained
            let cursor = cursor + 1;
            self.current[winner] = cursor;
            if cursor == self.segment[winner].len() {
                winner_key = K::supremum();
                self.release_slot(winner);
            } else {
                winner_key = self.segment[winner][cursor].key;
            }

            // replay the matches on the path back to the root; on equal
            // keys the sitting loser stays put (instability is contractual)
            let mut node = (winner + self.k) >> 1;
            while node > 0 {
                if self.entry[node].key < winner_key {
                    std::mem::swap(&mut self.entry[node].key, &mut winner_key);
                    std::mem::swap(&mut self.entry[node].index, &mut winner);
                }
                node >>= 1;
            }
        }
        self.entry[0] = Entry {
            key: winner_key,
            index: winner,
        };
        self.len -= count;

        let live = self.k - self.free.len();
        if self.k > 1 && live <= self.k / 2 {
            self.compact_tree();
        }
    }

    /// Returns a drained slot's storage to the free pool.
    fn release_slot(&mut self, slot: usize) {
        self.segment[slot] = Vec::new();
        self.current[slot] = 0;
        self.free.push(slot);
    }

    /// Doubles the arity, handing the new leaves to the free pool, and
    /// rebuilds the tournament from scratch. Amortized against the inserts
    /// that filled the previous arity.
    fn double_k(&mut self) {
        debug_assert!(self.free.is_empty());
        assert!(self.k < self.max_arity, "level arity exhausted");
        // push in reverse so the lowest index is occupied first
        for slot in (self.k..2 * self.k).rev() {
            self.current[slot] = 0;
            self.segment[slot] = Vec::new();
            self.free.push(slot);
        }
        self.k *= 2;
        self.log_k += 1;
        self.rebuild();
    }

    /// Shifts live segments to the leftmost slots, halves the arity as far
    /// as utilization allows, and rebuilds the tournament.
    fn compact_tree(&mut self) {
        debug_assert!(self.log_k > 0);
        let mut live = 0;
        for from in 0..self.k {
            if self.current[from] < self.segment[from].len() {
                self.segment.swap(live, from);
                self.current.swap(live, from);
                live += 1;
            }
        }
        while self.k > 1 && live <= self.k / 2 {
            self.k /= 2;
            self.log_k -= 1;
        }
        self.free.clear();
        for slot in (live..self.k).rev() {
            self.segment[slot] = Vec::new();
            self.current[slot] = 0;
            self.free.push(slot);
        }
        self.rebuild();
    }

    /// Recomputes every tournament node from the current leaves.
    fn rebuild(&mut self) {
        let winner = self.init_winner(1);
        self.entry[0] = Entry {
            key: self.slot_key(winner),
            index: winner,
        };
    }

    /// Plays the subtree rooted at `node`, recording losers on the way up.
    /// Returns the slot index of the subtree's winner.
    fn init_winner(&mut self, node: usize) -> usize {
        if node >= self.k {
            return node - self.k;
        }
        let left = self.init_winner(2 * node);
        let right = self.init_winner(2 * node + 1);
        let left_key = self.slot_key(left);
        let right_key = self.slot_key(right);
        if left_key <= right_key {
            self.entry[node] = Entry {
                key: right_key,
                index: right,
            };
            left
        } else {
            self.entry[node] = Entry {
                key: left_key,
                index: left,
            };
            right
        }
    }

    /// Repairs the path from `node` to the root after a segment landed at a
    /// leaf, without touching the rest of the tree. Returns the (key, index)
    /// the unchanged tree had routed through this node and the bit mask that
    /// distinguishes the two subtrees at this depth.
    fn update_path(&mut self, node: usize, new_key: K, new_index: usize) -> (K, usize, usize) {
        if node == 0 {
            let mask = if self.log_k == 0 {
                0
            } else {
                1usize << (self.log_k - 1)
            };
            let winner_key = self.entry[0].key;
            let winner_index = self.entry[0].index;
            if new_key < winner_key {
                self.entry[0] = Entry {
                    key: new_key,
                    index: new_index,
                };
            }
            return (winner_key, winner_index, mask);
        }

        let (mut winner_key, mut winner_index, mask) =
            self.update_path(node >> 1, new_key, new_index);
        let loser_key = self.entry[node].key;
        let loser_index = self.entry[node].index;
        if (winner_index & mask) != (new_index & mask) {
            // the old winner came from the sibling subtree, so the new
            // segment competes here; nothing changes when both came down
            // the same side, because the match below already decided it
            if new_key < loser_key {
                if new_key < winner_key {
                    self.entry[node] = Entry {
                        key: winner_key,
                        index: winner_index,
                    };
                } else {
                    self.entry[node] = Entry {
                        key: new_key,
                        index: new_index,
                    };
                }
            }
            winner_key = loser_key;
            winner_index = loser_index;
        }
        (winner_key, winner_index, mask >> 1)
    }
}
