//! Tree nodes for the relaxed radix balanced tree.
//!
//! A node is either a *leaf* holding up to `1 << BITS` elements or an
//! *inner* node holding up to `1 << BITS` child handles. Inner nodes carry
//! an explicit strict/relaxed discriminant in the form of an optional size
//! table:
//!
//! - **Strict**: no size table. Every child except possibly the last holds
//!   exactly `1 << shift` elements, so indexing is plain shift/mask radix
//!   arithmetic.
//! - **Relaxed**: a parallel table of cumulative child element counts.
//!   Required whenever children are not uniformly full, which happens after
//!   concatenation, slicing, or front growth.
//!
//! # Invariants
//!
//! - A node's element count equals the sum of its children's counts (for a
//!   leaf, its slot count).
//! - A size table is strictly increasing and its last entry equals the
//!   node's own element count.
//! - No node is empty; the empty vector is represented above this layer by
//!   an absent root and an empty tail.

use crate::memory::MemoryPolicy;

/// Shared handle to a node, as allocated by the active memory policy.
pub type NodeRef<T, P, const BITS: usize> = <P as MemoryPolicy>::Handle<Node<T, P, BITS>>;

/// A node of the tree: a leaf of elements or an inner routing node.
///
/// `BITS` is the radix width; every node holds at most `1 << BITS` slots.
pub enum Node<T, P: MemoryPolicy, const BITS: usize> {
    /// Ordered elements, at most `1 << BITS` of them.
    Leaf(Vec<T>),
    /// Child handles plus an optional cumulative size table.
    Inner(Inner<T, P, BITS>),
}

/// Payload of an inner node.
pub struct Inner<T, P: MemoryPolicy, const BITS: usize> {
    pub(crate) children: Vec<NodeRef<T, P, BITS>>,
    /// Cumulative element counts per child; `None` means strict.
    pub(crate) sizes: Option<Vec<usize>>,
}

impl<T, P: MemoryPolicy, const BITS: usize> Node<T, P, BITS> {
    /// Maximum slots per node.
    pub(crate) const WIDTH: usize = 1 << BITS;

    /// Borrow the element slice of a leaf.
    ///
    /// Reaching an inner node here indicates a height bookkeeping defect,
    /// which fails loudly rather than being masked.
    pub(crate) fn as_leaf(&self) -> &[T] {
        match self {
            Self::Leaf(elems) => elems,
            Self::Inner(_) => unreachable!("inner node where a leaf was expected"),
        }
    }

    /// Mutably borrow the element buffer of a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut Vec<T> {
        match self {
            Self::Leaf(elems) => elems,
            Self::Inner(_) => unreachable!("inner node where a leaf was expected"),
        }
    }

    /// Borrow the inner payload.
    pub(crate) fn as_inner(&self) -> &Inner<T, P, BITS> {
        match self {
            Self::Inner(inner) => inner,
            Self::Leaf(_) => unreachable!("leaf node where an inner node was expected"),
        }
    }

    /// Number of occupied slots: elements for a leaf, children for an inner.
    pub(crate) fn slot_count(&self) -> usize {
        match self {
            Self::Leaf(elems) => elems.len(),
            Self::Inner(inner) => inner.children.len(),
        }
    }

    /// Total element count of the subtree rooted here.
    ///
    /// O(1) for leaves and relaxed nodes; for strict nodes it walks the
    /// rightmost spine, since only the last child may be partial.
    pub(crate) fn tree_size(&self, shift: usize) -> usize {
        match self {
            Self::Leaf(elems) => elems.len(),
            Self::Inner(inner) => match &inner.sizes {
                Some(sizes) => sizes.last().copied().unwrap_or(0),
                None => {
                    let full = (inner.children.len() - 1) << shift;
                    full + inner
                        .children
                        .last()
                        .map_or(0, |child| child.tree_size(shift - BITS))
                }
            },
        }
    }

    /// Build an inner node from `children` for level `shift`, computing the
    /// size table and discarding it again when the children turn out to be
    /// uniformly full.
    ///
    /// This is the single place size tables are derived; the concatenation
    /// and slice engines both repair trimmed or rebalanced spines with it.
    pub(crate) fn from_children(children: Vec<NodeRef<T, P, BITS>>, shift: usize) -> Self {
        debug_assert!(!children.is_empty(), "inner node must have children");
        debug_assert!(children.len() <= Self::WIDTH);
        let mut sizes = Vec::with_capacity(children.len());
        let mut total = 0;
        let mut strict = true;
        for (slot, child) in children.iter().enumerate() {
            let count = child.tree_size(shift - BITS);
            total += count;
            if slot + 1 != children.len() && count != 1 << shift {
                strict = false;
            }
            sizes.push(total);
        }
        Self::Inner(Inner {
            children,
            sizes: if strict { None } else { Some(sizes) },
        })
    }

    /// Verify every invariant of the subtree rooted here, returning its
    /// element count. Panics on any violation.
    pub(crate) fn check(&self, shift: usize) -> usize {
        match self {
            Self::Leaf(elems) => {
                assert_eq!(shift, 0, "leaf at nonzero shift {shift}");
                assert!(!elems.is_empty(), "empty leaf");
                assert!(elems.len() <= Self::WIDTH, "overfull leaf");
                elems.len()
            }
            Self::Inner(inner) => {
                assert!(shift >= BITS, "inner node at shift {shift}");
                assert!(!inner.children.is_empty(), "inner node without children");
                assert!(inner.children.len() <= Self::WIDTH, "overfull inner node");
                let counts: Vec<usize> = inner
                    .children
                    .iter()
                    .map(|child| child.check(shift - BITS))
                    .collect();
                match &inner.sizes {
                    Some(sizes) => {
                        assert_eq!(sizes.len(), counts.len(), "size table length mismatch");
                        let mut total = 0;
                        for (entry, count) in sizes.iter().zip(&counts) {
                            total += count;
                            assert_eq!(*entry, total, "size table entry mismatch");
                        }
                    }
                    None => {
                        for count in &counts[..counts.len() - 1] {
                            assert_eq!(*count, 1 << shift, "partial child in strict node");
                        }
                    }
                }
                counts.iter().sum()
            }
        }
    }
}

impl<T, P: MemoryPolicy, const BITS: usize> Inner<T, P, BITS> {
    /// Locate the child covering `index` at level `shift`.
    ///
    /// Returns the child slot and the index relative to that child. Relaxed
    /// nodes scan the size table starting from the radix guess, which is a
    /// lower bound because relaxed children never exceed their radix span.
    pub(crate) fn position(&self, index: usize, shift: usize) -> (usize, usize) {
        match &self.sizes {
            Some(sizes) => {
                let mut slot = index >> shift;
                while sizes[slot] <= index {
                    slot += 1;
                }
                let prefix = if slot == 0 { 0 } else { sizes[slot - 1] };
                (slot, index - prefix)
            }
            None => {
                let mask = (1_usize << BITS) - 1;
                ((index >> shift) & mask, index & ((1 << shift) - 1))
            }
        }
    }

    /// Materialize the size table of a strict node, or borrow the existing
    /// one. Used by operations that are about to make the node non-uniform.
    pub(crate) fn ensure_sizes(&mut self, shift: usize) -> &mut Vec<usize> {
        let children = &self.children;
        self.sizes.get_or_insert_with(|| {
            let mut sizes = Vec::with_capacity(children.len());
            let mut total = 0;
            for child in children {
                total += child.tree_size(shift - BITS);
                sizes.push(total);
            }
            sizes
        })
    }
}

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Clone for Node<T, P, BITS> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(elems) => Self::Leaf(elems.clone()),
            Self::Inner(inner) => Self::Inner(Inner {
                children: inner.children.iter().map(P::retain).collect(),
                sizes: inner.sizes.clone(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
