//! Relaxed concatenation engine.
//!
//! Merges two trees of arbitrary, unequal height and fill in
//! O(log(max(|L|, |R|))) node allocations. The merge walks the right spine
//! of the left tree and the left spine of the right tree bottom-up; at every
//! level the children around the seam are redistributed according to a
//! *concatenation plan* so that the relaxed radix balance invariant holds:
//! after rebalancing, the node count at each level is within [`E_MAX`] of
//! the optimum for the number of slots present.
//!
//! The slack constant trades rebalancing frequency against node fill; it is
//! a tuning parameter, not a correctness invariant. Larger values rebalance
//! less and leave sparser nodes.

use std::ops::Add;

use crate::memory::MemoryPolicy;
use crate::node::{Node, NodeRef};
use crate::tracing_helpers::trace_log;
use crate::tree::Vector;

/// Maximum number of extra nodes tolerated at a level before the seam is
/// rebalanced.
const E_MAX: usize = 2;

/// A node is "full enough" to be skipped by redistribution when it is within
/// this many slots of capacity.
const E_INVARIANT: usize = 1;

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Vector<T, P, BITS> {
    /// New vector holding the elements of `self` followed by those of
    /// `other`. Also available as the `+` operator.
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        // The left tail moves into the left tree; the right tail survives
        // as the tail of the result.
        let mut left = self.clone();
        let tail = std::mem::replace(&mut left.tail, P::allocate(Node::Leaf(Vec::new())));
        left.push_tail(tail);
        let Some(left_root) = left.root else {
            unreachable!("flushed tree without a root")
        };
        let mut out = match &other.root {
            None => Self {
                size: self.size + other.size,
                shift: left.shift,
                root: Some(left_root),
                tail: P::retain(&other.tail),
            },
            Some(right_root) => {
                let (root, shift) =
                    Self::concat_sub(&left_root, left.shift, right_root, other.shift, true);
                Self {
                    size: self.size + other.size,
                    shift,
                    root: Some(root),
                    tail: P::retain(&other.tail),
                }
            }
        };
        out.collapse_root();
        out
    }

    /// Merge two subtrees, returning the merged node and its shift.
    ///
    /// Height difference is an explicit parameter: the shorter side is
    /// merged into the boundary child of the taller side first. Except at
    /// the top, the returned node is one level above `max(ls, rs)` and
    /// holds one or two rebalanced children.
    fn concat_sub(
        l: &NodeRef<T, P, BITS>,
        ls: usize,
        r: &NodeRef<T, P, BITS>,
        rs: usize,
        top: bool,
    ) -> (NodeRef<T, P, BITS>, usize) {
        if ls > rs {
            let children = &l.as_inner().children;
            let (centre, cs) =
                Self::concat_sub(&children[children.len() - 1], ls - BITS, r, rs, false);
            debug_assert_eq!(cs, ls);
            Self::rebalance(Some(l), &centre, None, ls, top)
        } else if ls < rs {
            let children = &r.as_inner().children;
            let (centre, cs) = Self::concat_sub(l, ls, &children[0], rs - BITS, false);
            debug_assert_eq!(cs, rs);
            Self::rebalance(None, &centre, Some(r), rs, top)
        } else if ls == 0 {
            // Two leaves at the seam.
            let left_elems = l.as_leaf();
            let right_elems = r.as_leaf();
            if left_elems.len() + right_elems.len() <= Self::WIDTH {
                let mut elems = Vec::with_capacity(left_elems.len() + right_elems.len());
                elems.extend_from_slice(left_elems);
                elems.extend_from_slice(right_elems);
                let merged = P::allocate(Node::Leaf(elems));
                if top {
                    (merged, 0)
                } else {
                    (P::allocate(Node::from_children(vec![merged], BITS)), BITS)
                }
            } else {
                let children = vec![P::retain(l), P::retain(r)];
                (P::allocate(Node::from_children(children, BITS)), BITS)
            }
        } else {
            let left_children = &l.as_inner().children;
            let right_children = &r.as_inner().children;
            let (centre, cs) = Self::concat_sub(
                &left_children[left_children.len() - 1],
                ls - BITS,
                &right_children[0],
                rs - BITS,
                false,
            );
            debug_assert_eq!(cs, ls);
            Self::rebalance(Some(l), &centre, Some(r), ls, top)
        }
    }

    /// Rebalance the seam at `shift`: the children of `left` (minus its
    /// last), all of `centre`, and the children of `right` (minus its
    /// first) are redistributed per the concatenation plan and regrouped
    /// into one or two nodes.
    fn rebalance(
        left: Option<&NodeRef<T, P, BITS>>,
        centre: &NodeRef<T, P, BITS>,
        right: Option<&NodeRef<T, P, BITS>>,
        shift: usize,
        top: bool,
    ) -> (NodeRef<T, P, BITS>, usize) {
        let mut all: Vec<NodeRef<T, P, BITS>> = Vec::new();
        if let Some(l) = left {
            let children = &l.as_inner().children;
            all.extend(children[..children.len() - 1].iter().map(P::retain));
        }
        all.extend(centre.as_inner().children.iter().map(P::retain));
        if let Some(r) = right {
            let children = &r.as_inner().children;
            all.extend(children[1..].iter().map(P::retain));
        }

        let mut counts: Vec<usize> = all.iter().map(|node| node.slot_count()).collect();
        Self::concat_plan(&mut counts);
        trace_log!(
            seam = all.len(),
            packed = counts.len(),
            shift,
            "rebalancing concat seam"
        );
        let mut packed = Self::execute_plan(&all, &counts, shift - BITS);

        if packed.len() <= Self::WIDTH {
            let node = P::allocate(Node::from_children(packed, shift));
            if top {
                (node, shift)
            } else {
                (
                    P::allocate(Node::from_children(vec![node], shift + BITS)),
                    shift + BITS,
                )
            }
        } else {
            let overflow = packed.split_off(Self::WIDTH);
            let first = P::allocate(Node::from_children(packed, shift));
            let second = P::allocate(Node::from_children(overflow, shift));
            (
                P::allocate(Node::from_children(vec![first, second], shift + BITS)),
                shift + BITS,
            )
        }
    }

    /// Shrink a per-node slot-count distribution until it is within
    /// [`E_MAX`] of the optimal node count, redistributing the slots of
    /// under-full nodes into their right neighbours.
    fn concat_plan(counts: &mut Vec<usize>) {
        let total: usize = counts.iter().sum();
        let optimal = total.div_ceil(Self::WIDTH);
        let mut slot = 0;
        while counts.len() > optimal + E_MAX {
            while counts[slot] > Self::WIDTH - E_INVARIANT {
                slot += 1;
            }
            // Pour this node's slots into the ones after it.
            let mut remaining = counts[slot];
            loop {
                let merged = usize::min(remaining + counts[slot + 1], Self::WIDTH);
                remaining = remaining + counts[slot + 1] - merged;
                counts[slot] = merged;
                slot += 1;
                if remaining == 0 {
                    break;
                }
            }
            counts.remove(slot);
            slot -= 1;
        }
    }

    /// Build the node list described by `counts` out of the slots of `all`,
    /// reusing any node whose slots are already exactly right.
    fn execute_plan(
        all: &[NodeRef<T, P, BITS>],
        counts: &[usize],
        child_shift: usize,
    ) -> Vec<NodeRef<T, P, BITS>> {
        let mut out = Vec::with_capacity(counts.len());
        let mut source = 0;
        let mut offset = 0;
        for &want in counts {
            if offset == 0 && all[source].slot_count() == want {
                out.push(P::retain(&all[source]));
                source += 1;
                continue;
            }
            if child_shift == 0 {
                let mut elems: Vec<T> = Vec::with_capacity(want);
                while elems.len() < want {
                    let have = all[source].as_leaf();
                    let take = usize::min(want - elems.len(), have.len() - offset);
                    elems.extend_from_slice(&have[offset..offset + take]);
                    offset += take;
                    if offset == have.len() {
                        source += 1;
                        offset = 0;
                    }
                }
                out.push(P::allocate(Node::Leaf(elems)));
            } else {
                let mut children = Vec::with_capacity(want);
                while children.len() < want {
                    let have = &all[source].as_inner().children;
                    let take = usize::min(want - children.len(), have.len() - offset);
                    children.extend(have[offset..offset + take].iter().map(P::retain));
                    offset += take;
                    if offset == have.len() {
                        source += 1;
                        offset = 0;
                    }
                }
                out.push(P::allocate(Node::from_children(children, child_shift)));
            }
        }
        out
    }
}

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Add for &Vector<T, P, BITS> {
    type Output = Vector<T, P, BITS>;

    fn add(self, rhs: Self) -> Vector<T, P, BITS> {
        self.concat(rhs)
    }
}

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Add for Vector<T, P, BITS> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.concat(&rhs)
    }
}

// ============================================================================
// Tests
// ============================================================================
