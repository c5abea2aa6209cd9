//! Shared-ownership storage.
//!
//! The target lives in a [`triomphe::Arc`]. Duplicating the storage bumps the
//! reference count instead of copying the target, so it succeeds even for
//! move-only targets, and releasing the storage frees the target once the
//! last reference is gone.
//!
//! The count is atomic, so releasing and duplicating storages that point at
//! the same target is sound from any thread. Whether the storages themselves
//! may cross threads is decided by the wrapper that holds them.

use core::ptr::NonNull;

use crate::{
    storage::{Storage, StorageKind, Strategy},
    util::Erased,
};

/// Shares its target through a reference count.
///
/// The pointer is guaranteed to have been created using
/// [`triomphe::Arc::into_raw`].
#[repr(transparent)]
pub struct Shared {
    /// Pointer to the shared target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `triomphe::Arc<T>` for
    ///    some `T` using `triomphe::Arc::into_raw`.
    /// 2. The pointer retains full provenance over the `Arc` for the entire
    ///    lifetime of this object (i.e., it was not derived from a `&T`)
    /// 3. This object accounts for exactly one strong reference until
    ///    [`Strategy::release`] is called.
    ptr: NonNull<Erased>,
}

impl Shared {
    /// Creates a [`Shared`] from a [`triomphe::Arc`], taking over its strong
    /// reference.
    #[inline]
    fn from_arc<T: 'static>(arc: triomphe::Arc<T>) -> Self {
        let ptr: *const T = triomphe::Arc::into_raw(arc);
        let ptr: *mut Erased = ptr.cast::<Erased>().cast_mut();

        // SAFETY:
        // 1. Triomphe guarantees that `Arc::into_raw` returns a non-null pointer.
        let ptr: NonNull<Erased> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }
}

// SAFETY:
// 1. The pointer points into the `Arc` allocation, which stays alive while
//    this object holds its strong reference. Moving the `Shared` does not move
//    the allocation.
// 2. `Shared` does not implement `MutableStorage`.
// 3. `Shared` does not implement `Drop`.
unsafe impl Storage for Shared {
    const KIND: StorageKind = StorageKind::Shared;

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        self.ptr
    }
}

// SAFETY:
// 1. `materialize` moves the value into a fresh `Arc<T>`.
// 2. `release` gives up one strong reference, and `Arc` frees the target only
//    when it was the last one.
// 3. `duplicate` takes a new strong reference, which is released
//    independently.
unsafe impl<T: 'static> Strategy<T> for Shared {
    type Target = T;

    #[inline]
    fn materialize(value: T) -> Self {
        Self::from_arc(triomphe::Arc::new(value))
    }

    #[inline]
    unsafe fn release(&mut self) {
        let ptr: *const T = self.ptr.cast::<T>().as_ptr().cast_const();

        // SAFETY:
        // 1. The pointer comes from `Arc::<T>::into_raw`, since the caller
        //    guarantees that this storage was materialized with this `T`.
        // 2. The caller guarantees that this strong reference has not been
        //    released before and is not used afterwards.
        let arc: triomphe::Arc<T> = unsafe { triomphe::Arc::from_raw(ptr) };
        drop(arc);
    }

    #[inline]
    unsafe fn duplicate(&self, _copy: Option<fn(&T) -> T>) -> Option<Self> {
        let ptr: *const T = self.ptr.cast::<T>().as_ptr().cast_const();

        // SAFETY:
        // 1. The pointer comes from `Arc::<T>::into_raw` and the `Arc` is kept
        //    alive by our own strong reference for the duration of the borrow.
        let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

        Some(Self::from_arc(arc_borrow.clone_arc()))
    }

    #[inline]
    unsafe fn share_count(&self) -> Option<usize> {
        let ptr: *const T = self.ptr.cast::<T>().as_ptr().cast_const();

        // SAFETY:
        // 1. The pointer comes from `Arc::<T>::into_raw` and the `Arc` is kept
        //    alive by our own strong reference for the duration of the borrow.
        let arc_borrow = unsafe { triomphe::ArcBorrow::from_ptr(ptr) };

        Some(triomphe::ArcBorrow::strong_count(&arc_borrow))
    }
}
