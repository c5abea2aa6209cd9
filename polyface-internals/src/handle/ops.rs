//! Type-erased operations on a handle's storage.
//!
//! This module encapsulates the fields of [`HandleOps`] so they cannot be
//! accessed directly. This visibility restriction guarantees the safety
//! invariant: **the operations' type parameters match the strategy, value
//! type and copy policy that were used to materialize the storage**.
//!
//! # Safety Invariant
//!
//! This invariant is maintained because [`HandleOps`] can only be created via
//! [`HandleOps::new`], which pairs the function pointers with a specific
//! strategy `S: Strategy<V>` and policy `P` at compile time. Unlike a
//! `&'static` vtable the operations are stored by value, since storages such
//! as [`BorrowedMut<'a>`] are not `'static`.
//!
//! [`BorrowedMut<'a>`]: crate::storage::BorrowedMut

use core::any::TypeId;

use crate::{
    policy::CopyPolicy,
    storage::{Storage, Strategy},
};

/// Operations for a type-erased storage.
///
/// # Safety Invariant
///
/// The fields `release`, `duplicate` and `share_count` are guaranteed to
/// point to the functions defined below instantiated with the value type `V`
/// and copy policy `P` that were used to create this [`HandleOps`].
pub(crate) struct HandleOps<S> {
    /// Gets the [`TypeId`] of the target.
    target_type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the target.
    target_type_name: fn() -> &'static str,
    /// Releases the target held by the storage.
    release: unsafe fn(&mut S),
    /// Duplicates the storage according to the copy policy.
    duplicate: unsafe fn(&S) -> Option<S>,
    /// Gets the share count of the storage.
    share_count: unsafe fn(&S) -> Option<usize>,
}

impl<S> Clone for HandleOps<S> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for HandleOps<S> {}

impl<S: Storage> HandleOps<S> {
    /// Creates the operations for values of type `V` materialized with the
    /// strategy `S`, copied according to `P`.
    #[inline]
    pub(super) fn new<V, P>() -> Self
    where
        S: Strategy<V>,
        P: CopyPolicy<<S as Strategy<V>>::Target>,
    {
        Self {
            target_type_id: TypeId::of::<<S as Strategy<V>>::Target>,
            target_type_name: core::any::type_name::<<S as Strategy<V>>::Target>,
            release: release::<S, V>,
            duplicate: duplicate::<S, V, P>,
            share_count: share_count::<S, V>,
        }
    }

    /// Gets the [`TypeId`] of the target.
    #[inline]
    pub(super) fn target_type_id(&self) -> TypeId {
        (self.target_type_id)()
    }

    /// Gets the [`core::any::type_name`] of the target.
    #[inline]
    pub(super) fn target_type_name(&self) -> &'static str {
        (self.target_type_name)()
    }

    /// Releases the target held by `storage`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. These [`HandleOps`] were created for the value type that `storage`
    ///    was materialized with.
    /// 2. `storage` has not been released before, and it is not used after
    ///    this call.
    #[inline]
    pub(super) unsafe fn release(&self, storage: &mut S) {
        // SAFETY: We know that `self.release` points to the function
        // `release::<S, V>` below. That function's safety requirements are upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            // @add-unsafe-context: release
            (self.release)(storage);
        }
    }

    /// Duplicates `storage` according to the copy policy.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. These [`HandleOps`] were created for the value type that `storage`
    ///    was materialized with.
    /// 2. `storage` has not been released.
    #[inline]
    pub(super) unsafe fn duplicate(&self, storage: &S) -> Option<S> {
        // SAFETY: We know that `self.duplicate` points to the function
        // `duplicate::<S, V, P>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            // @add-unsafe-context: duplicate
            (self.duplicate)(storage)
        }
    }

    /// Gets the share count of `storage`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. These [`HandleOps`] were created for the value type that `storage`
    ///    was materialized with.
    /// 2. `storage` has not been released.
    #[inline]
    pub(super) unsafe fn share_count(&self, storage: &S) -> Option<usize> {
        // SAFETY: We know that `self.share_count` points to the function
        // `share_count::<S, V>` below. That function's safety requirements are
        // upheld:
        // 1. Guaranteed by the caller
        // 2. Guaranteed by the caller
        unsafe {
            // @add-unsafe-context: share_count
            (self.share_count)(storage)
        }
    }
}

/// Releases the target held by `storage`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` was materialized with the value type `V`.
/// 2. `storage` has not been released before, and it is not used after this
///    call.
unsafe fn release<S: Strategy<V>, V>(storage: &mut S) {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe {
        <S as Strategy<V>>::release(storage);
    }
}

/// Duplicates `storage`, deep-copying the target through `P` if the strategy
/// needs to.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` was materialized with the value type `V`.
/// 2. `storage` has not been released.
unsafe fn duplicate<S, V, P>(storage: &S) -> Option<S>
where
    S: Strategy<V>,
    P: CopyPolicy<<S as Strategy<V>>::Target>,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe { <S as Strategy<V>>::duplicate(storage, P::COPY) }
}

/// Gets the share count of `storage`.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` was materialized with the value type `V`.
/// 2. `storage` has not been released.
unsafe fn share_count<S: Strategy<V>, V>(storage: &S) -> Option<usize> {
    // SAFETY:
    // 1. Guaranteed by the caller
    // 2. Guaranteed by the caller
    unsafe { <S as Strategy<V>>::share_count(storage) }
}
