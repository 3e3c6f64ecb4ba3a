//! Traversal and reduction.
//!
//! A depth-first, left-to-right walk that visits whole leaves as tight
//! inner loops and folds eagerly; no auxiliary sequence of elements is ever
//! materialized. A fresh walk over the same (immutable) vector always
//! repeats identically.

use crate::memory::MemoryPolicy;
use crate::node::Node;
use crate::tree::Vector;

impl<T, P: MemoryPolicy, const BITS: usize> Vector<T, P, BITS> {
    /// Fold `combine` over all elements in index order, starting from
    /// `seed`.
    ///
    /// ```rust
    /// use rrbvec::Vector;
    ///
    /// let mut v: Vector<u64> = Vector::new();
    /// for i in 0..10 {
    ///     v.push_back_mut(i);
    /// }
    /// assert_eq!(v.reduce(|acc, x| acc + x, 0), 45);
    /// ```
    pub fn reduce<A, F>(&self, mut combine: F, seed: A) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        let acc = match &self.root {
            Some(root) => Self::fold_node(root, seed, &mut combine),
            None => seed,
        };
        self.tail
            .as_leaf()
            .iter()
            .fold(acc, |acc, value| combine(acc, value))
    }

    fn fold_node<A, F>(node: &Node<T, P, BITS>, acc: A, combine: &mut F) -> A
    where
        F: FnMut(A, &T) -> A,
    {
        match node {
            Node::Leaf(elems) => elems.iter().fold(acc, |acc, value| combine(acc, value)),
            Node::Inner(inner) => inner
                .children
                .iter()
                .fold(acc, |acc, child| Self::fold_node(child, acc, combine)),
        }
    }

    /// Visit every leaf slice in index order. Internal building block for
    /// whole-structure walks that do not need per-element accumulators.
    pub(crate) fn for_each_leaf<'a>(&'a self, visit: &mut impl FnMut(&'a [T])) {
        if let Some(root) = &self.root {
            Self::visit_node(root, visit);
        }
        let tail = self.tail.as_leaf();
        if !tail.is_empty() {
            visit(tail);
        }
    }

    fn visit_node<'a>(node: &'a Node<T, P, BITS>, visit: &mut impl FnMut(&'a [T])) {
        match node {
            Node::Leaf(elems) => visit(elems),
            Node::Inner(inner) => {
                for child in &inner.children {
                    Self::visit_node(child, visit);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
