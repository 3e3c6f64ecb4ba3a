//! The persistent vector and its navigation/update engine.
//!
//! [`Vector`] is an immutable ordered sequence backed by a relaxed radix
//! balanced tree. Every "mutating" operation returns a new vector that
//! shares all unchanged subtrees with its input; the only nodes allocated
//! are the ones on the root-to-change path.
//!
//! # Layout
//!
//! ```text
//!             root (shift = BITS * height)
//!            /    \
//!          ...    ...          <- inner nodes, strict or relaxed
//!         /  \   /  \
//!       leaf leaf leaf         <- indices [0, size - tail_len)
//!
//!       tail: [ .. ]           <- last, possibly partial leaf, kept
//!                                 out-of-tree for O(1) amortized push_back
//! ```
//!
//! `shift` is the number of index bits consumed below the root during radix
//! descent; a root at shift 0 is itself a leaf. Root and tail together
//! partition the elements: the tail is never empty unless the vector is.
//!
//! # Mutation protocol
//!
//! The `*_mut` methods edit `self` through the memory policy's copy-on-write
//! access: shared nodes are copied, uniquely owned ones are updated in
//! place. The pure methods clone the handle set first (retaining every
//! node), so the vector they were called on is never affected.

use std::fmt;
use std::ops::Index;

use crate::memory::{MemoryPolicy, RcPolicy};
use crate::node::{Inner, Node, NodeRef};
use crate::tracing_helpers::trace_log;

/// A persistent sequence with O(log n) access, update, push, pop,
/// concatenation and slicing.
///
/// # Type Parameters
///
/// * `T` - Element type.
/// * `P` - Memory policy governing node ownership (default [`RcPolicy`]).
/// * `BITS` - Radix width; nodes hold up to `1 << BITS` slots (default 5,
///   i.e. a branching factor of 32). Stress configurations use 2 or 3.
///
/// # Example
///
/// ```rust
/// use rrbvec::Vector;
///
/// let v1: Vector<u32> = Vector::new();
/// let v2 = v1.push_back(42);
/// assert_eq!(v1.len(), 0);
/// assert_eq!(v2.len(), 1);
/// assert_eq!(v2[0], 42);
/// ```
pub struct Vector<T, P: MemoryPolicy = RcPolicy, const BITS: usize = 5> {
    pub(crate) size: usize,
    /// Radix shift of the root level; 0 means the root is a leaf.
    pub(crate) shift: usize,
    pub(crate) root: Option<NodeRef<T, P, BITS>>,
    /// Always a leaf node; empty only when the vector is empty.
    pub(crate) tail: NodeRef<T, P, BITS>,
}

impl<T, P: MemoryPolicy, const BITS: usize> Vector<T, P, BITS> {
    pub(crate) const WIDTH: usize = 1 << BITS;

    /// The empty vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            size: 0,
            shift: 0,
            root: None,
            tail: P::allocate(Node::Leaf(Vec::new())),
        }
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the vector holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub(crate) fn tail_len(&self) -> usize {
        self.tail.as_leaf().len()
    }

    /// Index of the first tail element.
    pub(crate) fn tail_offset(&self) -> usize {
        self.size - self.tail_len()
    }

    /// Borrow the element at `index`, or `None` when out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.size {
            return None;
        }
        let tail_offset = self.tail_offset();
        if index >= tail_offset {
            return self.tail.as_leaf().get(index - tail_offset);
        }
        let mut node = self.root.as_ref()?;
        let mut shift = self.shift;
        let mut index = index;
        loop {
            match &**node {
                Node::Leaf(elems) => return elems.get(index),
                Node::Inner(inner) => {
                    let (slot, sub) = inner.position(index, shift);
                    node = &inner.children[slot];
                    index = sub;
                    shift -= BITS;
                }
            }
        }
    }

    /// Borrow the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`; an out-of-range index is a contract
    /// violation and is never clamped or wrapped.
    #[must_use]
    pub fn at(&self, index: usize) -> &T {
        self.get(index).unwrap_or_else(|| {
            panic!("index {index} out of bounds (len {})", self.size)
        })
    }

    /// Borrow the first element.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Borrow the last element.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tail.as_leaf().last()
    }

    /// Verify every structural invariant of this vector, panicking on any
    /// violation. Debugging aid; a failure here indicates a defect in the
    /// balancing engines, not a user error.
    pub fn assert_invariants(&self) {
        let tail_len = self.tail_len();
        assert!(tail_len <= Self::WIDTH, "overfull tail");
        if self.size == 0 {
            assert_eq!(tail_len, 0, "non-empty tail in empty vector");
            assert!(self.root.is_none(), "root in empty vector");
            return;
        }
        assert!(tail_len >= 1, "empty tail in non-empty vector");
        match &self.root {
            None => assert_eq!(self.size, tail_len, "size/tail mismatch"),
            Some(root) => {
                let counted = root.check(self.shift);
                assert_eq!(counted + tail_len, self.size, "size/census mismatch");
            }
        }
    }
}

// ============================================================================
//  Path-copying updates
// ============================================================================

impl<T: Clone, P: MemoryPolicy, const BITS: usize> Vector<T, P, BITS> {
    /// New vector with the element at `index` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`.
    #[must_use]
    pub fn assoc(&self, index: usize, value: T) -> Self {
        let mut out = self.clone();
        out.assoc_mut(index, value);
        out
    }

    /// Replace the element at `index` in place (copy-on-write).
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`.
    pub fn assoc_mut(&mut self, index: usize, value: T) {
        self.with_slot_mut(index, |slot| *slot = value);
    }

    /// New vector with the element at `index` replaced by `f(old)`.
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`.
    #[must_use]
    pub fn update<F>(&self, index: usize, f: F) -> Self
    where
        F: FnOnce(&T) -> T,
    {
        let mut out = self.clone();
        out.with_slot_mut(index, |slot| *slot = f(slot));
        out
    }

    fn with_slot_mut<F: FnOnce(&mut T)>(&mut self, index: usize, f: F) {
        assert!(
            index < self.size,
            "index {index} out of bounds (len {})",
            self.size
        );
        let tail_offset = self.tail_offset();
        if index >= tail_offset {
            let elems = P::make_mut(&mut self.tail).as_leaf_mut();
            f(&mut elems[index - tail_offset]);
            return;
        }
        let Some(root) = self.root.as_mut() else {
            unreachable!("tree index without a root")
        };
        Self::update_node(root, self.shift, index, f);
    }

    fn update_node<F: FnOnce(&mut T)>(
        node: &mut NodeRef<T, P, BITS>,
        shift: usize,
        index: usize,
        f: F,
    ) {
        match P::make_mut(node) {
            Node::Leaf(elems) => f(&mut elems[index]),
            Node::Inner(inner) => {
                let (slot, sub) = inner.position(index, shift);
                Self::update_node(&mut inner.children[slot], shift - BITS, sub, f);
            }
        }
    }

    // ========================================================================
    //  push_back
    // ========================================================================

    /// New vector with `value` appended.
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        let mut out = self.clone();
        out.push_back_mut(value);
        out
    }

    /// Append `value` in place (copy-on-write).
    pub fn push_back_mut(&mut self, value: T) {
        if self.tail_len() < Self::WIDTH {
            P::make_mut(&mut self.tail).as_leaf_mut().push(value);
            self.size += 1;
            return;
        }
        // Tail is full: flush it into the tree and start a fresh one.
        let full_tail =
            std::mem::replace(&mut self.tail, P::allocate(Node::Leaf(vec![value])));
        self.push_tail(full_tail);
        self.size += 1;
    }

    /// Push a (possibly partial) leaf onto the right edge of the tree,
    /// growing a level when every slot down the right spine is taken.
    pub(crate) fn push_tail(&mut self, leaf: NodeRef<T, P, BITS>) {
        let Some(mut root) = self.root.take() else {
            self.root = Some(leaf);
            self.shift = 0;
            return;
        };
        match Self::push_leaf(&mut root, self.shift, leaf) {
            Ok(()) => self.root = Some(root),
            Err(leaf) => {
                let new_shift = self.shift + BITS;
                trace_log!(new_shift, "growing a root level on push");
                let spine = Self::spine(leaf, new_shift - BITS);
                self.root = Some(P::allocate(Node::from_children(
                    vec![root, spine],
                    new_shift,
                )));
                self.shift = new_shift;
            }
        }
    }

    fn push_leaf(
        node: &mut NodeRef<T, P, BITS>,
        shift: usize,
        leaf: NodeRef<T, P, BITS>,
    ) -> Result<(), NodeRef<T, P, BITS>> {
        if shift == 0 {
            // Root is itself a leaf; only a new level above can host more.
            return Err(leaf);
        }
        let leaf_len = leaf.as_leaf().len();
        let inner = match P::make_mut(node) {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("leaf at nonzero shift"),
        };
        if shift == BITS {
            if inner.children.len() == Self::WIDTH {
                return Err(leaf);
            }
            Self::append_child(inner, shift, leaf);
            return Ok(());
        }
        let tail_slot = inner.children.len() - 1;
        match Self::push_leaf(&mut inner.children[tail_slot], shift - BITS, leaf) {
            Ok(()) => {
                if let Some(sizes) = &mut inner.sizes {
                    if let Some(last) = sizes.last_mut() {
                        *last += leaf_len;
                    }
                }
                Ok(())
            }
            Err(leaf) => {
                if inner.children.len() == Self::WIDTH {
                    return Err(leaf);
                }
                let spine = Self::spine(leaf, shift - BITS);
                Self::append_child(inner, shift, spine);
                Ok(())
            }
        }
    }

    /// Append `child` to `inner`, materializing a size table first when the
    /// previous last child is partial (strict layout would be violated).
    fn append_child(inner: &mut Inner<T, P, BITS>, shift: usize, child: NodeRef<T, P, BITS>) {
        debug_assert!(inner.children.len() < Self::WIDTH);
        let child_count = child.tree_size(shift - BITS);
        let last_full = inner
            .children
            .last()
            .is_some_and(|last| last.tree_size(shift - BITS) == 1 << shift);
        if inner.sizes.is_some() || !last_full {
            let sizes = inner.ensure_sizes(shift);
            let total = sizes.last().copied().unwrap_or(0);
            sizes.push(total + child_count);
        }
        inner.children.push(child);
    }

    /// Wrap `node` in single-child inner nodes until it sits at `shift`.
    pub(crate) fn spine(node: NodeRef<T, P, BITS>, shift: usize) -> NodeRef<T, P, BITS> {
        let mut node = node;
        let mut level = 0;
        while level < shift {
            level += BITS;
            node = P::allocate(Node::from_children(vec![node], level));
        }
        node
    }

    // ========================================================================
    //  push_front
    // ========================================================================

    /// New vector with `value` prepended.
    ///
    /// There is no head buffer mirroring the tail: front growth goes
    /// straight into the tree, creating an undersized leftmost leaf and
    /// hence relaxed nodes along the left spine.
    #[must_use]
    pub fn push_front(&self, value: T) -> Self {
        let mut out = self.clone();
        out.push_front_mut(value);
        out
    }

    /// Prepend `value` in place (copy-on-write).
    pub fn push_front_mut(&mut self, value: T) {
        let Some(mut root) = self.root.take() else {
            if self.tail_len() < Self::WIDTH {
                // The tail is the whole vector; prepend directly into it.
                P::make_mut(&mut self.tail).as_leaf_mut().insert(0, value);
            } else {
                // Tail full: the new head becomes the first tree leaf.
                self.root = Some(P::allocate(Node::Leaf(vec![value])));
                self.shift = 0;
            }
            self.size += 1;
            return;
        };
        match Self::push_head(&mut root, self.shift, value) {
            Ok(()) => self.root = Some(root),
            Err(value) => {
                // Left spine is full at every level: grow a root whose
                // first child is a minimal spine holding just the value.
                let new_shift = self.shift + BITS;
                trace_log!(new_shift, "growing a root level on push_front");
                let head = Self::spine(P::allocate(Node::Leaf(vec![value])), new_shift - BITS);
                self.root = Some(P::allocate(Node::from_children(
                    vec![head, root],
                    new_shift,
                )));
                self.shift = new_shift;
            }
        }
        self.size += 1;
    }

    fn push_head(node: &mut NodeRef<T, P, BITS>, shift: usize, value: T) -> Result<(), T> {
        match P::make_mut(node) {
            Node::Leaf(elems) => {
                if elems.len() == Self::WIDTH {
                    return Err(value);
                }
                elems.insert(0, value);
                Ok(())
            }
            Node::Inner(inner) => {
                // Materialize before mutating below; front growth makes the
                // node non-uniform either way.
                inner.ensure_sizes(shift);
                match Self::push_head(&mut inner.children[0], shift - BITS, value) {
                    Ok(()) => {
                        if let Some(sizes) = &mut inner.sizes {
                            for entry in sizes.iter_mut() {
                                *entry += 1;
                            }
                        }
                        Ok(())
                    }
                    Err(value) => {
                        if inner.children.len() == Self::WIDTH {
                            return Err(value);
                        }
                        let head = Self::spine(P::allocate(Node::Leaf(vec![value])), shift - BITS);
                        if let Some(sizes) = &mut inner.sizes {
                            sizes.insert(0, 0);
                            for entry in sizes.iter_mut() {
                                *entry += 1;
                            }
                        }
                        inner.children.insert(0, head);
                        Ok(())
                    }
                }
            }
        }
    }

    // ========================================================================
    //  pop_back / pop_front
    // ========================================================================

    /// New vector with the last element removed, or `None` when empty.
    #[must_use]
    pub fn pop_back(&self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }
        let mut out = self.clone();
        out.pop_back_mut();
        Some(out)
    }

    /// Remove and return the last element (copy-on-write).
    pub fn pop_back_mut(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let value = P::make_mut(&mut self.tail).as_leaf_mut().pop();
        if self.tail.as_leaf().is_empty() && self.root.is_some() {
            // Shrunk the tail to nothing: pull the rightmost tree leaf out
            // as the new tail.
            self.tail = self.pull_rightmost_leaf();
        }
        self.size -= 1;
        value
    }

    /// New vector with the first element removed, or `None` when empty.
    #[must_use]
    pub fn pop_front(&self) -> Option<Self> {
        if self.is_empty() {
            return None;
        }
        let mut out = self.clone();
        out.pop_front_mut();
        Some(out)
    }

    /// Remove and return the first element (copy-on-write).
    pub fn pop_front_mut(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let Some(mut root) = self.root.take() else {
            let value = P::make_mut(&mut self.tail).as_leaf_mut().remove(0);
            self.size -= 1;
            return Some(value);
        };
        let (value, drained) = Self::pop_head(&mut root, self.shift);
        if drained {
            self.shift = 0;
        } else {
            self.root = Some(root);
            self.collapse_root();
        }
        self.size -= 1;
        Some(value)
    }

    fn pop_head(node: &mut NodeRef<T, P, BITS>, shift: usize) -> (T, bool) {
        match P::make_mut(node) {
            Node::Leaf(elems) => {
                let value = elems.remove(0);
                (value, elems.is_empty())
            }
            Node::Inner(inner) => {
                if inner.children.len() > 1 {
                    // Shrinking the first child breaks radix alignment.
                    inner.ensure_sizes(shift);
                }
                let (value, child_drained) = Self::pop_head(&mut inner.children[0], shift - BITS);
                if let Some(sizes) = &mut inner.sizes {
                    for entry in sizes.iter_mut() {
                        *entry -= 1;
                    }
                    if child_drained {
                        sizes.remove(0);
                    }
                }
                if child_drained {
                    inner.children.remove(0);
                }
                (value, inner.children.is_empty())
            }
        }
    }

    /// Detach the rightmost leaf of the tree and return it, collapsing the
    /// root as needed. The tree must be non-empty.
    pub(crate) fn pull_rightmost_leaf(&mut self) -> NodeRef<T, P, BITS> {
        let Some(mut root) = self.root.take() else {
            unreachable!("pull from a vector without a root")
        };
        if self.shift == 0 {
            // The root is itself a leaf; the tree becomes empty.
            return root;
        }
        let (leaf, drained) = Self::pop_leaf(&mut root, self.shift);
        if drained {
            self.shift = 0;
        } else {
            self.root = Some(root);
            self.collapse_root();
        }
        leaf
    }

    fn pop_leaf(node: &mut NodeRef<T, P, BITS>, shift: usize) -> (NodeRef<T, P, BITS>, bool) {
        let inner = match P::make_mut(node) {
            Node::Inner(inner) => inner,
            Node::Leaf(_) => unreachable!("leaf at nonzero shift"),
        };
        if shift == BITS {
            let Some(leaf) = inner.children.pop() else {
                unreachable!("inner node without children")
            };
            if let Some(sizes) = &mut inner.sizes {
                sizes.pop();
            }
            return (leaf, inner.children.is_empty());
        }
        let tail_slot = inner.children.len() - 1;
        let (leaf, child_drained) = Self::pop_leaf(&mut inner.children[tail_slot], shift - BITS);
        if child_drained {
            inner.children.pop();
            if let Some(sizes) = &mut inner.sizes {
                sizes.pop();
            }
        } else if let Some(sizes) = &mut inner.sizes {
            if let Some(last) = sizes.last_mut() {
                *last -= leaf.as_leaf().len();
            }
        }
        (leaf, inner.children.is_empty())
    }

    /// Drop single-child root levels until the root has fan-out again.
    pub(crate) fn collapse_root(&mut self) {
        while self.shift > 0 {
            let child = match self.root.as_deref() {
                Some(Node::Inner(inner)) if inner.children.len() == 1 => {
                    P::retain(&inner.children[0])
                }
                _ => break,
            };
            self.root = Some(child);
            self.shift -= BITS;
        }
    }
}

// ============================================================================
//  Value-type trait impls
// ============================================================================

impl<T, P: MemoryPolicy, const BITS: usize> Clone for Vector<T, P, BITS> {
    fn clone(&self) -> Self {
        Self {
            size: self.size,
            shift: self.shift,
            root: self.root.as_ref().map(P::retain),
            tail: P::retain(&self.tail),
        }
    }
}

impl<T, P: MemoryPolicy, const BITS: usize> Default for Vector<T, P, BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P: MemoryPolicy, const BITS: usize> Index<usize> for Vector<T, P, BITS> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.at(index)
    }
}

impl<T: PartialEq, P: MemoryPolicy, const BITS: usize> PartialEq for Vector<T, P, BITS> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && (0..self.size).all(|i| self.at(i) == other.at(i))
    }
}

impl<T: Eq, P: MemoryPolicy, const BITS: usize> Eq for Vector<T, P, BITS> {}

impl<T: fmt::Debug, P: MemoryPolicy, const BITS: usize> fmt::Debug for Vector<T, P, BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        self.for_each_leaf(&mut |chunk| {
            list.entries(chunk);
        });
        list.finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
