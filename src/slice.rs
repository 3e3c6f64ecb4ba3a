//! Slice engine: `take` and `drop`.
//!
//! Both operations copy only the spine from the boundary to the root:
//! whole subtrees outside the kept range are discarded, the boundary leaf
//! is truncated, and the copied spine nodes get fresh size tables through
//! the same constructor the concatenation engine rebalances with
//! ([`Node::from_children`]). Truncation generally leaves the spine
//! relaxed, and `take` re-establishes the tail invariant by pulling the
//! new rightmost leaf back out of the tree.

use crate::memory::MemoryPolicy;
use crate::node::{Node, NodeRef};
use crate::tracing_helpers::trace_log;
use crate::tree::Vector;

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Vector<T, P, BITS> {
    /// New vector holding the first `count` elements, `[0, count)`.
    ///
    /// # Panics
    ///
    /// Panics when `count > len()`.
    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        assert!(
            count <= self.size,
            "take of {count} out of bounds (len {})",
            self.size
        );
        if count == 0 {
            return Self::new();
        }
        if count == self.size {
            return self.clone();
        }
        let tail_offset = self.tail_offset();
        if count > tail_offset {
            // The cut lands inside the tail; the tree is kept whole.
            let kept = self.tail.as_leaf()[..count - tail_offset].to_vec();
            return Self {
                size: count,
                shift: self.shift,
                root: self.root.as_ref().map(P::retain),
                tail: P::allocate(Node::Leaf(kept)),
            };
        }
        let Some(root) = self.root.as_ref() else {
            unreachable!("cut inside a tree without a root")
        };
        trace_log!(count, shift = self.shift, "taking prefix from tree");
        let mut out = Self {
            size: count,
            shift: self.shift,
            root: Some(Self::take_node(root, self.shift, count)),
            tail: P::allocate(Node::Leaf(Vec::new())),
        };
        out.collapse_root();
        out.tail = out.pull_rightmost_leaf();
        out
    }

    /// Copy of the subtree keeping only its first `count` elements.
    fn take_node(node: &NodeRef<T, P, BITS>, shift: usize, count: usize) -> NodeRef<T, P, BITS> {
        debug_assert!(count > 0);
        if count == node.tree_size(shift) {
            return P::retain(node);
        }
        match &**node {
            Node::Leaf(elems) => P::allocate(Node::Leaf(elems[..count].to_vec())),
            Node::Inner(inner) => {
                let (slot, sub) = inner.position(count - 1, shift);
                let mut children: Vec<NodeRef<T, P, BITS>> =
                    inner.children[..slot].iter().map(P::retain).collect();
                children.push(Self::take_node(&inner.children[slot], shift - BITS, sub + 1));
                P::allocate(Node::from_children(children, shift))
            }
        }
    }

    /// New vector holding the elements from `count` on, `[count, len)`.
    ///
    /// # Panics
    ///
    /// Panics when `count > len()`.
    #[must_use]
    pub fn drop(&self, count: usize) -> Self {
        assert!(
            count <= self.size,
            "drop of {count} out of bounds (len {})",
            self.size
        );
        if count == 0 {
            return self.clone();
        }
        if count == self.size {
            return Self::new();
        }
        let tail_offset = self.tail_offset();
        if count >= tail_offset {
            // Everything kept already lives in the tail.
            let kept = self.tail.as_leaf()[count - tail_offset..].to_vec();
            return Self {
                size: self.size - count,
                shift: 0,
                root: None,
                tail: P::allocate(Node::Leaf(kept)),
            };
        }
        let Some(root) = self.root.as_ref() else {
            unreachable!("cut inside a tree without a root")
        };
        trace_log!(count, shift = self.shift, "dropping prefix from tree");
        let mut out = Self {
            size: self.size - count,
            shift: self.shift,
            root: Some(Self::drop_node(root, self.shift, count)),
            tail: P::retain(&self.tail),
        };
        out.collapse_root();
        out
    }

    /// Copy of the subtree with its first `count` elements removed.
    fn drop_node(node: &NodeRef<T, P, BITS>, shift: usize, count: usize) -> NodeRef<T, P, BITS> {
        debug_assert!(count > 0);
        match &**node {
            Node::Leaf(elems) => P::allocate(Node::Leaf(elems[count..].to_vec())),
            Node::Inner(inner) => {
                let (slot, sub) = inner.position(count, shift);
                let mut children: Vec<NodeRef<T, P, BITS>> = Vec::with_capacity(
                    inner.children.len() - slot,
                );
                if sub == 0 {
                    children.push(P::retain(&inner.children[slot]));
                } else {
                    children.push(Self::drop_node(&inner.children[slot], shift - BITS, sub));
                }
                children.extend(inner.children[slot + 1..].iter().map(P::retain));
                P::allocate(Node::from_children(children, shift))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
