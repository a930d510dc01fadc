//! Cache-Efficient Hierarchical Priority Queue for Rust
//!
//! This crate provides a *sequence heap*: a key-ordered priority queue that
//! stays fast at sizes far beyond cache capacity by buffering insertions in
//! a small binary heap and keeping the bulk of the queue in long sorted runs
//! merged on demand through loser-tree tournaments.
//!
//! # Structure
//!
//! - **Insertion buffer** ([`insertion::InsertionHeap`]): a fixed-capacity,
//!   sentinel-padded binary min-heap that absorbs insertions.
//! - **Merge levels** ([`loser_tree::LoserTree`]): each level holds up to a
//!   bounded arity of sorted segments behind a tournament of losers and
//!   extracts its smallest elements in batches.
//! - **Orchestrator** ([`SequenceHeap`]): stacks the levels, cascades full
//!   levels upward, and serves the minimum from the smaller of its two
//!   fronts (insertion buffer, top output cache).
//!
//! # Time Complexity
//!
//! | Operation    | Complexity                                |
//! |--------------|-------------------------------------------|
//! | `insert`     | O(log(N / insertion bandwidth)) amortized |
//! | `peek_min`   | O(1)                                      |
//! | `delete_min` | O(log(N / insertion bandwidth)) amortized |
//!
//! The constants are what matter: every merge pass streams sequentially
//! through memory, and the comparison-heavy state (insertion buffer, output
//! caches, tournament nodes) fits in a few kilobytes.
//!
//! # Example
//!
//! ```rust
//! use sequence_heap::SequenceHeap;
//!
//! let mut heap: SequenceHeap<u64, &str> = SequenceHeap::new();
//! heap.insert(30, "timer");
//! heap.insert(10, "io");
//! heap.insert(20, "tick");
//!
//! assert_eq!(heap.peek_min(), (&10, &"io"));
//! assert_eq!(heap.delete_min(), (10, "io"));
//! assert_eq!(heap.delete_min(), (20, "tick"));
//! assert_eq!(heap.len(), 1);
//! ```
//!
//! # Not provided
//!
//! No `decrease_key`, no stability for equal keys, no thread safety, no
//! spilling to disk. Keys must implement [`KeyBounds`] (total order plus an
//! infimum/supremum sentinel pair); the sentinels themselves are not legal
//! keys.
//!
//! # References
//!
//! - Sanders, P. (2000). "Fast Priority Queues for Cached Memory."
//!   *ACM Journal of Experimental Algorithmics*, 5.

pub mod bounds;
pub mod element;
pub mod heap;
pub mod insertion;
pub mod loser_tree;

pub use bounds::KeyBounds;
pub use element::Element;
pub use heap::{CapacityError, Config, SequenceHeap};
