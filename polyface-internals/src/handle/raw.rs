//! The type-erased owning handle.
//!
//! This module encapsulates the `storage` and `ops` fields of [`RawHandle`],
//! ensuring they are only visible within this module. This visibility
//! restriction guarantees the safety invariant: **the operations always
//! match the value type the storage was materialized with**.
//!
//! # Safety Invariant
//!
//! Since both fields can only be set together via [`RawHandle::new`] (or
//! copied together by [`RawHandle::try_duplicate`]) and cannot be modified
//! afterward, every call through `ops` is made with the value type and copy
//! policy that produced `storage`.
//!
//! The [`RawHandle::drop`] implementation relies on this invariant to release
//! the target exactly once.

use core::{any::TypeId, marker::PhantomData};

use crate::{
    handle::{
        ops::HandleOps,
        target::{RawTargetMut, RawTargetRef},
    },
    policy::CopyPolicy,
    storage::{MutableStorage, Storage, Strategy},
};

/// A storage together with the operations needed to release and copy the
/// target materialized into it.
///
/// A handle always holds a target: there is no empty state, and moving a
/// handle moves the responsibility for releasing it. A handle is neither
/// [`Send`] nor [`Sync`], whatever the target is.
pub struct RawHandle<S: Storage> {
    /// The storage holding the target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The storage was produced by a [`Strategy`] for the value type that
    ///    `ops` was created for.
    /// 2. The storage has not been released, except during the execution of
    ///    the `Drop` implementation.
    storage: S,

    /// Operations for `storage`
    ops: HandleOps<S>,

    /// Keeps the handle on the thread it was created on.
    _not_send: PhantomData<*mut ()>,
}

impl<S: Storage> RawHandle<S> {
    /// Creates a new [`RawHandle`] by materializing `value` with the strategy
    /// `S`, using the copy policy `P` for later deep copies.
    #[inline]
    pub fn new<V, P>(value: V) -> Self
    where
        S: Strategy<V>,
        P: CopyPolicy<<S as Strategy<V>>::Target>,
    {
        Self {
            storage: <S as Strategy<V>>::materialize(value),
            ops: HandleOps::new::<V, P>(),
            _not_send: PhantomData,
        }
    }

    /// Returns a shared erased pointer to the target.
    #[inline]
    pub fn as_ref(&self) -> RawTargetRef<'_> {
        // SAFETY:
        // 1. The `Storage` contract guarantees that the pointer is valid for
        //    shared access while the storage is borrowed, and the storage has
        //    not been released (guaranteed by the invariants on this type).
        unsafe { RawTargetRef::new(self.storage.target()) }
    }

    /// Returns an exclusive erased pointer to the target.
    #[inline]
    pub fn as_mut(&mut self) -> RawTargetMut<'_>
    where
        S: MutableStorage,
    {
        // SAFETY:
        // 1. The `Storage` and `MutableStorage` contracts guarantee that the
        //    pointer is valid for exclusive access while the storage is
        //    mutably borrowed, and the storage has not been released
        //    (guaranteed by the invariants on this type).
        unsafe { RawTargetMut::new(self.storage.target()) }
    }

    /// Produces a second handle for the same logical value.
    ///
    /// Returns `None` when the strategy needs a deep copy and the copy policy
    /// does not provide one, or when the strategy cannot be duplicated at all.
    /// `self` is left untouched either way.
    #[inline]
    pub fn try_duplicate(&self) -> Option<Self> {
        // SAFETY:
        // 1. `ops` was created for the value type that `storage` was
        //    materialized with (guaranteed by the invariants on this type).
        // 2. The storage has not been released.
        let storage = unsafe { self.ops.duplicate(&self.storage) }?;

        Some(Self {
            // SAFETY:
            // 1. The duplicate was produced by the same strategy and value
            //    type, so the same operations apply to it.
            // 2. It has not been released yet.
            storage,
            ops: self.ops,
            _not_send: PhantomData,
        })
    }

    /// Returns the number of handles sharing the target, if the strategy
    /// shares.
    #[inline]
    pub fn share_count(&self) -> Option<usize> {
        // SAFETY:
        // 1. `ops` was created for the value type that `storage` was
        //    materialized with (guaranteed by the invariants on this type).
        // 2. The storage has not been released.
        unsafe { self.ops.share_count(&self.storage) }
    }

    /// Returns the [`TypeId`] of the target.
    #[inline]
    pub fn target_type_id(&self) -> TypeId {
        self.ops.target_type_id()
    }

    /// Returns the [`core::any::type_name`] of the target.
    #[inline]
    pub fn target_type_name(&self) -> &'static str {
        self.ops.target_type_name()
    }

    /// Returns the storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> core::ops::Drop for RawHandle<S> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY:
        // 1. `ops` was created for the value type that `storage` was
        //    materialized with (guaranteed by the invariants on this type).
        // 2. The storage has not been released before, and it is not used
        //    afterwards, as we are in the drop function.
        unsafe {
            // @add-unsafe-context: HandleOps
            self.ops.release(&mut self.storage);
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};
    use core::cell::Cell;

    use super::*;
    use crate::{
        policy::{Copyable, MoveOnly},
        storage::{Borrowed, BorrowedMut, Heap, Inline, Sbo, Shared},
    };

    #[test]
    fn test_raw_handle_not_send_sync() {
        static_assertions::assert_not_impl_any!(RawHandle<Heap>: Send, Sync);
        static_assertions::assert_not_impl_any!(RawHandle<Inline<16>>: Send, Sync);
        static_assertions::assert_not_impl_any!(RawHandle<Shared>: Send, Sync);
    }

    #[test]
    fn test_raw_handle_type_info() {
        let handle = RawHandle::<Heap>::new::<String, Copyable>(String::from("Square"));
        assert_eq!(handle.target_type_id(), TypeId::of::<String>());
        assert_eq!(handle.target_type_name(), core::any::type_name::<String>());
        assert_eq!(handle.share_count(), None);

        // SAFETY: The target is a `String`.
        assert_eq!(unsafe { handle.as_ref().downcast_unchecked::<String>() }, "Square");
    }

    #[test]
    fn test_raw_handle_copy_policy() {
        let copyable = RawHandle::<Inline<32>>::new::<String, Copyable>(String::from("Circle"));
        let copy = copyable.try_duplicate().unwrap();
        assert_ne!(copyable.as_ref().as_ptr(), copy.as_ref().as_ptr());

        let move_only = RawHandle::<Sbo<32>>::new::<String, MoveOnly>(String::from("Circle"));
        assert!(move_only.try_duplicate().is_none());

        let shared = RawHandle::<Shared>::new::<String, MoveOnly>(String::from("Circle"));
        let alias = shared.try_duplicate().unwrap();
        assert_eq!(shared.as_ref().as_ptr(), alias.as_ref().as_ptr());
        assert_eq!(alias.share_count(), Some(2));
        drop(shared);
        assert_eq!(alias.share_count(), Some(1));
    }

    #[test]
    fn test_raw_handle_drop_releases_once() {
        let tracker = Rc::new(());
        let handle = RawHandle::<Heap>::new::<Rc<()>, Copyable>(tracker.clone());
        let copy = handle.try_duplicate().unwrap();
        assert_eq!(Rc::strong_count(&tracker), 3);
        drop(handle);
        drop(copy);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_raw_handle_borrowed() {
        let counter = Cell::new(0_u32);
        {
            let handle = RawHandle::<Borrowed<'_>>::new::<&Cell<u32>, MoveOnly>(&counter);
            let alias = handle.try_duplicate().unwrap();
            // SAFETY: The target is a `Cell<u32>`.
            unsafe { alias.as_ref().downcast_unchecked::<Cell<u32>>() }.set(9);
        }
        assert_eq!(counter.get(), 9);

        let mut value = String::from("Square");
        {
            let mut handle = RawHandle::<BorrowedMut<'_>>::new::<&mut String, Copyable>(&mut value);
            assert!(handle.try_duplicate().is_none());
            // SAFETY: The target is a `String`.
            unsafe { handle.as_mut().downcast_unchecked::<String>() }.push_str("Mutable");
        }
        assert_eq!(value, "SquareMutable");
    }
}
