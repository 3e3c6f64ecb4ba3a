//! Behavioral suite for the persistent vector.
//!
//! Every scenario is a generic function instantiated for each memory policy,
//! so the whole suite doubles as the substitutability check: behavior must
//! be identical under reference counting (atomic or not) and under the
//! traced policy that never mutates in place.

#![allow(clippy::unwrap_used, reason = "fail fast in tests")]

mod common;

use common::{assert_elements, build_back, build_front};
use rrbvec::memory::MemoryPolicy;
use rrbvec::{ArcPolicy, RcPolicy, TracedPolicy, Vector};

// ============================================================================
//  Instantiation
// ============================================================================

fn instantiation<P: MemoryPolicy>() {
    let v: Vector<u32, P> = Vector::new();
    assert_eq!(v.len(), 0);
    assert!(v.is_empty());
}

#[test]
fn instantiation_all_policies() {
    instantiation::<RcPolicy>();
    instantiation::<ArcPolicy>();
    instantiation::<TracedPolicy>();
}

// ============================================================================
//  push_back
// ============================================================================

fn push_back_one<P: MemoryPolicy>() {
    let v1: Vector<u32, P> = Vector::new();
    let v2 = v1.push_back(42);
    assert_eq!(v1.len(), 0);
    assert_eq!(v2.len(), 1);
    assert_eq!(*v2.at(0), 42);
}

fn push_back_many<P: MemoryPolicy, const BITS: usize>() {
    let n = 666_u32;
    let mut v: Vector<u32, P, BITS> = Vector::new();
    for i in 0..n {
        v = v.push_back(i * 42);
        assert_eq!(v.len() as u32, i + 1);
        v.assert_invariants();
        for j in 0..v.len() {
            assert_eq!(*v.at(j), j as u32 * 42);
        }
    }
}

#[test]
fn push_back_rc() {
    push_back_one::<RcPolicy>();
    push_back_many::<RcPolicy, 5>();
    push_back_many::<RcPolicy, 2>();
}

#[test]
fn push_back_arc() {
    push_back_one::<ArcPolicy>();
    push_back_many::<ArcPolicy, 2>();
}

#[test]
fn push_back_traced() {
    push_back_one::<TracedPolicy>();
    push_back_many::<TracedPolicy, 2>();
}

// ============================================================================
//  assoc / update
// ============================================================================

fn assoc_basic<P: MemoryPolicy>() {
    let v = build_back::<P, 5>(0..42);
    let u = v.assoc(3, 13);
    assert_eq!(u.len(), v.len());
    assert_eq!(*u.at(2), 2);
    assert_eq!(*u.at(3), 13);
    assert_eq!(*u.at(4), 4);
    assert_eq!(*u.at(40), 40);
    assert_eq!(*v.at(3), 3);
}

fn assoc_deep<P: MemoryPolicy>() {
    let v = build_back::<P, 5>(0..666);
    let u = v.assoc(3, 13).assoc(200, 7);
    assert_eq!(u.len(), v.len());
    assert_eq!(*u.at(2), 2);
    assert_eq!(*u.at(4), 4);
    assert_eq!(*u.at(40), 40);
    assert_eq!(*u.at(600), 600);
    assert_eq!(*u.at(3), 13);
    assert_eq!(*u.at(200), 7);
    assert_eq!(*v.at(3), 3);
    assert_eq!(*v.at(200), 200);
}

fn assoc_every_slot<P: MemoryPolicy>() {
    // Width 16 with 1000 elements: interior, leaf-boundary and
    // root-boundary positions are all exercised.
    let mut v = build_back::<P, 4>(0..1000);
    for i in 0..v.len() {
        v = v.assoc(i, i as u32 + 1);
        assert_eq!(*v.at(i), i as u32 + 1);
    }
    v.assert_invariants();
}

fn update_applies<P: MemoryPolicy>() {
    let v = build_back::<P, 5>(0..42);
    let u = v.update(10, |x| x + 10);
    assert_eq!(u.len(), v.len());
    assert_eq!(*u.at(10), 20);
    assert_eq!(*v.at(40), 40);

    let w = v.update(40, |x| x - 10);
    assert_eq!(w.len(), v.len());
    assert_eq!(*w.at(40), 30);
    assert_eq!(*v.at(40), 40);
}

#[test]
fn update_rc() {
    assoc_basic::<RcPolicy>();
    assoc_deep::<RcPolicy>();
    assoc_every_slot::<RcPolicy>();
    update_applies::<RcPolicy>();
}

#[test]
fn update_arc() {
    assoc_basic::<ArcPolicy>();
    assoc_deep::<ArcPolicy>();
    update_applies::<ArcPolicy>();
}

#[test]
fn update_traced() {
    assoc_basic::<TracedPolicy>();
    assoc_deep::<TracedPolicy>();
    assoc_every_slot::<TracedPolicy>();
    update_applies::<TracedPolicy>();
}

// ============================================================================
//  push_front
// ============================================================================

fn push_front_many<P: MemoryPolicy, const BITS: usize>() {
    let n = 666_u32;
    let mut v: Vector<u32, P, BITS> = Vector::new();
    for i in 0..n {
        v = v.push_front(i);
        assert_eq!(v.len() as u32, i + 1);
        v.assert_invariants();
        for j in 0..v.len() {
            assert_eq!(*v.at(v.len() - j - 1), j as u32);
        }
    }
}

#[test]
fn push_front_rc() {
    push_front_many::<RcPolicy, 3>();
}

#[test]
fn push_front_traced() {
    push_front_many::<TracedPolicy, 3>();
}

// ============================================================================
//  concat
// ============================================================================

fn concat_anywhere<P: MemoryPolicy>() {
    let n = 666_u32;

    // Prefixes of 0..n built by push_back.
    let mut all_lhs: Vec<Vector<u32, P, 3>> = Vec::with_capacity(n as usize);
    let mut v: Vector<u32, P, 3> = Vector::new();
    for i in 0..n {
        all_lhs.push(v.clone());
        v.push_back_mut(i);
    }

    // Suffixes ending at n-1 built by push_front: all_rhs[k] = [n-1-k, n-1).
    let mut all_rhs: Vec<Vector<u32, P, 3>> = Vec::with_capacity(n as usize);
    let mut v: Vector<u32, P, 3> = Vector::new();
    for i in 0..n {
        all_rhs.push(v.clone());
        if n >= 2 + i {
            v.push_front_mut(n - 2 - i);
        }
    }

    for i in 0..n as usize {
        let c = &all_lhs[n as usize - i - 1] + &all_rhs[i];
        assert_eq!(c.len() as u32, n - 1);
        c.assert_invariants();
        for j in 0..c.len() {
            assert_eq!(*c.at(j), j as u32);
        }
    }
}

#[test]
fn concat_rc() {
    concat_anywhere::<RcPolicy>();
}

#[test]
fn concat_traced() {
    concat_anywhere::<TracedPolicy>();
}

#[test]
fn concat_mixed_policy_shapes() {
    // Strict left, relaxed right, every split point.
    let n = 200_u32;
    for split in 0..n {
        let a = build_back::<ArcPolicy, 2>(0..split);
        let b = build_front::<ArcPolicy, 2>(split..n);
        let c = &a + &b;
        c.assert_invariants();
        assert_elements(&c, 0..n);
    }
}

// ============================================================================
//  reduce
// ============================================================================

fn reduce_sum_regular<P: MemoryPolicy>() {
    let n = 666_u64;
    let mut v: Vector<u64, P> = Vector::new();
    for i in 0..n {
        v.push_back_mut(i);
    }
    let sum = v.reduce(|acc, x| acc + x, 0);
    assert_eq!(sum, n * (n - 1) / 2);
}

fn reduce_sum_relaxed<P: MemoryPolicy>() {
    let n = 666_u64;
    let mut v: Vector<u64, P> = Vector::new();
    for i in 0..n {
        v.push_front_mut(i);
    }
    let sum = v.reduce(|acc, x| acc + x, 0);
    assert_eq!(sum, n * (n - 1) / 2);
}

fn reduce_sum_relaxed_complex<P: MemoryPolicy>() {
    // v = push_front(i) + v doubles the vector every round:
    //   0
    //   1 0 0
    //   2 1 0 0 1 0 0
    //   3 2 1 0 0 1 0 0 2 1 0 0 1 0 0
    // After n rounds the element sum is 2^n - n - 1.
    let n = 20_u32;
    let mut v: Vector<u64, P, 3> = Vector::new();
    for i in 0..n {
        v = v.push_front(u64::from(i)) + v.clone();
        v.assert_invariants();
    }
    assert_eq!(v.len() as u64, (1_u64 << n) - 1);
    let sum = v.reduce(|acc, x| acc + x, 0);
    assert_eq!(sum, (1_u64 << n) - u64::from(n) - 1);
}

#[test]
fn reduce_rc() {
    reduce_sum_regular::<RcPolicy>();
    reduce_sum_relaxed::<RcPolicy>();
    reduce_sum_relaxed_complex::<RcPolicy>();
}

#[test]
fn reduce_traced() {
    reduce_sum_regular::<TracedPolicy>();
    reduce_sum_relaxed::<TracedPolicy>();
    reduce_sum_relaxed_complex::<TracedPolicy>();
}

// ============================================================================
//  take / drop
// ============================================================================

fn take_anywhere<P: MemoryPolicy>(relaxed: bool) {
    let n = 666_u32;
    let v: Vector<u32, P, 3> = if relaxed {
        build_front(0..n)
    } else {
        build_back(0..n)
    };
    for i in 0..=n as usize {
        let taken = v.take(i);
        assert_eq!(taken.len(), i);
        taken.assert_invariants();
        for j in 0..i {
            assert_eq!(*taken.at(j), *v.at(j));
        }
    }
}

fn drop_anywhere<P: MemoryPolicy>(relaxed: bool) {
    let n = 666_u32;
    let v: Vector<u32, P, 3> = if relaxed {
        build_front(0..n)
    } else {
        build_back(0..n)
    };
    for i in 0..=n as usize {
        let dropped = v.drop(i);
        assert_eq!(dropped.len(), n as usize - i);
        dropped.assert_invariants();
        for j in 0..dropped.len() {
            assert_eq!(*dropped.at(j), *v.at(j + i));
        }
    }
}

#[test]
fn take_rc() {
    take_anywhere::<RcPolicy>(false);
    take_anywhere::<RcPolicy>(true);
}

#[test]
fn take_traced() {
    take_anywhere::<TracedPolicy>(false);
    take_anywhere::<TracedPolicy>(true);
}

#[test]
fn drop_rc() {
    drop_anywhere::<RcPolicy>(false);
    drop_anywhere::<RcPolicy>(true);
}

#[test]
fn drop_traced() {
    drop_anywhere::<TracedPolicy>(false);
    drop_anywhere::<TracedPolicy>(true);
}

// ============================================================================
//  pops
// ============================================================================

fn pop_round_trip<P: MemoryPolicy, const BITS: usize>() {
    let n = 400_u32;
    let mut v: Vector<u32, P, BITS> = build_back(0..n);
    for expected in (0..n).rev() {
        assert_eq!(v.pop_back_mut(), Some(expected));
        v.assert_invariants();
    }
    assert!(v.is_empty());

    let mut v: Vector<u32, P, BITS> = build_back(0..n);
    for expected in 0..n {
        assert_eq!(v.pop_front_mut(), Some(expected));
        v.assert_invariants();
    }
    assert!(v.is_empty());
}

fn pop_pure_preserves_original<P: MemoryPolicy>() {
    let v = build_back::<P, 3>(0..100);
    let shorter = v.pop_back().unwrap();
    let shifted = v.pop_front().unwrap();
    assert_eq!(shorter.len(), 99);
    assert_eq!(shifted.len(), 99);
    assert_eq!(*shifted.at(0), 1);
    assert_elements(&v, 0..100);
}

#[test]
fn pops_rc() {
    pop_round_trip::<RcPolicy, 2>();
    pop_round_trip::<RcPolicy, 5>();
    pop_pure_preserves_original::<RcPolicy>();
}

#[test]
fn pops_traced() {
    pop_round_trip::<TracedPolicy, 2>();
    pop_pure_preserves_original::<TracedPolicy>();
}

// ============================================================================
//  Threading (ArcPolicy)
// ============================================================================

#[test]
fn arc_vector_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>(_value: &T) {}
    let v = build_back::<ArcPolicy, 5>(0..100);
    assert_send_sync(&v);
}

#[test]
fn arc_vector_shared_across_threads() {
    let v = build_back::<ArcPolicy, 3>(0..1000);
    let handles: Vec<_> = (0..4_usize)
        .map(|t| {
            let v = v.clone();
            std::thread::spawn(move || {
                // Concurrent reads plus thread-local derived versions.
                let local = v.assoc(t * 10, 9999);
                assert_eq!(*local.at(t * 10), 9999);
                v.reduce(|acc, x| acc + u64::from(*x), 0)
            })
        })
        .collect();
    let expected = 1000_u64 * 999 / 2;
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
