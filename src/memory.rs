//! Memory policies for shared tree nodes.
//!
//! Every node in the tree is owned through a policy-supplied handle. A node
//! may be referenced by any number of vector versions at once (structural
//! sharing), so the policy decides how lifetimes are tracked and whether a
//! node may be mutated in place.
//!
//! # Design
//!
//! The trait uses static dispatch (generics) for zero-cost abstraction. The
//! tree layers consume exactly five operations — allocate, retain, release,
//! uniqueness query, and copy-on-write access — and nothing else. No tree
//! code may assume which concrete strategy is active; in particular, all
//! path-copying logic must stay correct when [`MemoryPolicy::is_uniquely_owned`]
//! always answers `false`.
//!
//! # Implementors
//!
//! - [`RcPolicy`]: non-atomic reference counting, single-threaded use.
//! - [`ArcPolicy`]: atomic reference counting; vectors become `Send + Sync`.
//! - [`TracedPolicy`]: models externally-traced allocation. Uniqueness is
//!   conservatively denied, so every mutation copies.

use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

/// Ownership strategy for tree nodes.
///
/// The five operations below are the complete surface the tree consumes.
/// `retain`/`release` map onto Rust's `Clone`/`Drop` for the handle type and
/// are spelled out so the ownership protocol is visible at the call sites
/// that transfer node ownership.
pub trait MemoryPolicy {
    /// Shared-ownership handle to a value of type `U`.
    type Handle<U>: Clone + Deref<Target = U>;

    /// Allocate storage for `value` and return the first owning handle.
    fn allocate<U>(value: U) -> Self::Handle<U>;

    /// Record a new owner of the node behind `handle`.
    #[must_use]
    fn retain<U>(handle: &Self::Handle<U>) -> Self::Handle<U> {
        handle.clone()
    }

    /// Drop one owner of the node behind `handle`, freeing it if this was
    /// the last one (under reference counting) or leaving reclamation to
    /// the collector (under a tracing strategy).
    fn release<U>(handle: Self::Handle<U>) {
        drop(handle);
    }

    /// Whether `handle` is the sole owner of its node.
    ///
    /// `true` means mutating through the handle cannot be observed by any
    /// other vector version. A strategy may conservatively answer `false`;
    /// this only disables the in-place mutation optimization, never
    /// correctness.
    fn is_uniquely_owned<U>(handle: &mut Self::Handle<U>) -> bool;

    /// Copy-on-write access to the node behind `handle`.
    ///
    /// Mutates in place iff the handle is the sole owner; otherwise clones
    /// the node into a fresh uniquely-owned handle first. Either way the
    /// returned reference is safe to mutate without affecting other owners.
    fn make_mut<U: Clone>(handle: &mut Self::Handle<U>) -> &mut U;
}

// ============================================================================
//  RcPolicy
// ============================================================================

/// Deterministic non-atomic reference counting via [`Rc`].
///
/// The default policy. Frees a node synchronously when its count reaches
/// zero. Vectors under this policy are not `Send`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcPolicy;

impl MemoryPolicy for RcPolicy {
    type Handle<U> = Rc<U>;

    fn allocate<U>(value: U) -> Rc<U> {
        Rc::new(value)
    }

    fn is_uniquely_owned<U>(handle: &mut Rc<U>) -> bool {
        Rc::get_mut(handle).is_some()
    }

    fn make_mut<U: Clone>(handle: &mut Rc<U>) -> &mut U {
        Rc::make_mut(handle)
    }
}

// ============================================================================
//  ArcPolicy
// ============================================================================

/// Atomic reference counting via [`Arc`].
///
/// Vectors under this policy may be read and cloned concurrently from
/// multiple threads. The uniqueness query is a single atomic read, so the
/// in-place tail optimization is race-free: a handle that reports unique
/// ownership cannot gain owners from another thread, because every other
/// owner would have to be derived from this one.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcPolicy;

impl MemoryPolicy for ArcPolicy {
    type Handle<U> = Arc<U>;

    fn allocate<U>(value: U) -> Arc<U> {
        Arc::new(value)
    }

    fn is_uniquely_owned<U>(handle: &mut Arc<U>) -> bool {
        Arc::get_mut(handle).is_some()
    }

    fn make_mut<U: Clone>(handle: &mut Arc<U>) -> &mut U {
        Arc::make_mut(handle)
    }
}

// ============================================================================
//  TracedPolicy
// ============================================================================

/// Externally-traced allocation strategy.
///
/// Models a tracing collector owning all nodes: the uniqueness query
/// conservatively answers `false`, so every mutation goes through the full
/// copy-on-write path and no node is ever mutated in place. Storage here is
/// backed by [`Rc`] as a stand-in for collector-managed memory; under a real
/// collector `retain`/`release` would be no-ops and reclamation would happen
/// by tracing reachability.
///
/// Running the full behavioral suite under this policy is what verifies the
/// tree never depends on the in-place optimization being available.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracedPolicy;

impl MemoryPolicy for TracedPolicy {
    type Handle<U> = Rc<U>;

    fn allocate<U>(value: U) -> Rc<U> {
        Rc::new(value)
    }

    fn is_uniquely_owned<U>(_handle: &mut Rc<U>) -> bool {
        false
    }

    fn make_mut<U: Clone>(handle: &mut Rc<U>) -> &mut U {
        // Always copy, even when this handle happens to be unique.
        *handle = Rc::new((**handle).clone());
        Rc::make_mut(handle)
    }
}

// ============================================================================
// Tests
// ============================================================================
