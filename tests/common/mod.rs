//! Shared builders for the behavioral test suites.
//!
//! All helpers are generic over the memory policy and radix width so each
//! suite can be instantiated for every policy (substitutability) and for
//! stress widths.

#![allow(dead_code)]

use std::ops::Range;

use rrbvec::memory::MemoryPolicy;
use rrbvec::Vector;

/// Vector of `range` built by repeated `push_back`.
pub fn build_back<P: MemoryPolicy, const BITS: usize>(range: Range<u32>) -> Vector<u32, P, BITS> {
    let mut v = Vector::new();
    for i in range {
        v.push_back_mut(i);
    }
    v
}

/// Vector of `range` built by repeated `push_front` (relaxed shape).
pub fn build_front<P: MemoryPolicy, const BITS: usize>(range: Range<u32>) -> Vector<u32, P, BITS> {
    let mut v = Vector::new();
    for i in range.rev() {
        v.push_front_mut(i);
    }
    v
}

/// Check that `v` holds exactly `expected`, element by element.
pub fn assert_elements<P: MemoryPolicy, const BITS: usize>(
    v: &Vector<u32, P, BITS>,
    expected: impl Iterator<Item = u32>,
) {
    let mut len = 0;
    for (i, want) in expected.enumerate() {
        assert_eq!(*v.at(i), want, "mismatch at index {i}");
        len = i + 1;
    }
    assert_eq!(v.len(), len);
}
