//! # `rrbvec`
//!
//! A persistent vector backed by a relaxed radix balanced tree (RRB tree).
//!
//! Every "mutating" operation returns a new logical vector and leaves all
//! previously observed vectors unchanged; versions share unchanged subtrees,
//! so an update allocates only the O(log n) nodes on the root-to-change
//! path.
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `get` / `at` / `assoc` / `update` | O(log n) |
//! | `push_back` / `pop_back` | O(1) amortized |
//! | `push_front` / `pop_front` | O(log n) |
//! | `concat` | O(log max(n, m)) |
//! | `take` / `drop` | O(log n) |
//! | `reduce` | O(n) |
//!
//! A plain radix tree gives the first two rows; the *relaxed* part — inner
//! nodes that may carry a size table instead of assuming perfectly packed
//! children — is what buys sublinear concatenation and slicing, at the cost
//! of a rebalancing pass along the seam of every merge.
//!
//! ## Memory policies
//!
//! Node ownership is pluggable via [`MemoryPolicy`]:
//!
//! - [`RcPolicy`] (default): non-atomic reference counting.
//! - [`ArcPolicy`]: atomic reference counting; `Vector<T, ArcPolicy>` is
//!   `Send + Sync` when `T` is, so versions can be read and cloned across
//!   threads freely.
//! - [`TracedPolicy`]: models collector-owned storage; in-place mutation is
//!   never taken, every change copies.
//!
//! All tree logic is correct under any policy; uniqueness information only
//! enables an optimization.
//!
//! ## Example
//!
//! ```rust
//! use rrbvec::Vector;
//!
//! let mut v: Vector<u32> = Vector::new();
//! for i in 0..1000 {
//!     v.push_back_mut(i);
//! }
//!
//! let w = v.assoc(500, 42);
//! assert_eq!(v[500], 500); // old version untouched
//! assert_eq!(w[500], 42);
//!
//! let joined = v.take(10) + v.drop(990);
//! assert_eq!(joined.len(), 20);
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod concat;
pub mod memory;
pub mod node;
mod reduce;
mod slice;
pub mod tree;

mod tracing_helpers;

// Re-export main types for convenience
pub use memory::{ArcPolicy, MemoryPolicy, RcPolicy, TracedPolicy};
pub use tree::Vector;
