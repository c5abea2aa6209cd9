//! Heap-owning storage.
//!
//! This module encapsulates the `ptr` field of [`Heap`], ensuring it is only
//! visible within this module. This visibility restriction guarantees the
//! safety invariant: **the pointer always comes from `Box<T>`**.

use alloc::boxed::Box;
use core::ptr::NonNull;

use crate::{
    storage::{MutableStorage, Storage, StorageKind, Strategy},
    util::Erased,
};

/// Owns its target through a heap allocation.
///
/// The pointer is guaranteed to have been created using [`Box::into_raw`].
///
/// We cannot use a [`Box<T>`] directly, because that does not allow us to
/// type-erase the `T`.
#[repr(transparent)]
pub struct Heap {
    /// Pointer to the boxed target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<T>` for some `T`
    ///    using `Box::into_raw`.
    /// 2. The pointer will point to the same `T` for the entire lifetime of
    ///    this object.
    /// 3. The pointee is initialized until [`Strategy::release`] is called.
    ptr: NonNull<Erased>,
}

// SAFETY:
// 1. The pointer comes from `Box::into_raw` and keeps its full provenance, so
//    it stays valid for shared and exclusive access until released. Moving the
//    `Heap` does not move the allocation.
// 2. Each `Heap` owns its own allocation, since duplication deep-copies.
// 3. `Heap` does not implement `Drop`.
unsafe impl Storage for Heap {
    const KIND: StorageKind = StorageKind::Heap;

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        self.ptr
    }
}

// SAFETY: Every `Heap` owns a distinct allocation, so mutably borrowing one
// storage cannot alias a target reached through another.
unsafe impl MutableStorage for Heap {}

// SAFETY:
// 1. `materialize` boxes a `T`.
// 2. `release` drops the box, which is the only owner of the target.
// 3. `duplicate` boxes a fresh copy.
unsafe impl<T: 'static> Strategy<T> for Heap {
    type Target = T;

    #[inline]
    fn materialize(value: T) -> Self {
        let ptr: *mut T = Box::into_raw(Box::new(value));
        let ptr: *mut Erased = ptr.cast::<Erased>();

        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<Erased> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    #[inline]
    unsafe fn release(&mut self) {
        let ptr: *mut T = self.ptr.cast::<T>().as_ptr();

        // SAFETY:
        // 1. The pointer comes from `Box::<T>::into_raw`, since the caller
        //    guarantees that this storage was materialized with this `T`.
        // 2. The caller guarantees that the box has not been released before
        //    and is not used afterwards, so ownership can be reclaimed here.
        let boxed: Box<T> = unsafe { Box::from_raw(ptr) };
        drop(boxed);
    }

    #[inline]
    unsafe fn duplicate(&self, copy: Option<fn(&T) -> T>) -> Option<Self> {
        let copy = copy?;

        // SAFETY:
        // 1. The caller guarantees that the target is an initialized `T`.
        // 2. Shared access is allowed, since we only hold `&self`.
        let target: &T = unsafe { self.ptr.cast::<T>().as_ref() };

        Some(<Self as Strategy<T>>::materialize(copy(target)))
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String};

    use super::*;

    #[test]
    fn test_heap_size() {
        assert_eq!(core::mem::size_of::<Heap>(), core::mem::size_of::<usize>());
        assert_eq!(
            core::mem::size_of::<Option<Heap>>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_heap_round_trip() {
        let mut storage = <Heap as Strategy<String>>::materialize(String::from("Square"));

        // SAFETY: The storage holds a `String`.
        let target = unsafe { storage.target().cast::<String>().as_ref() };
        assert_eq!(target, "Square");

        // SAFETY: The storage was materialized with `String` and is released once.
        unsafe { <Heap as Strategy<String>>::release(&mut storage) };
    }

    #[test]
    fn test_heap_release_drops_target() {
        let tracker = Rc::new(());
        let mut storage = <Heap as Strategy<Rc<()>>>::materialize(tracker.clone());
        assert_eq!(Rc::strong_count(&tracker), 2);

        // SAFETY: The storage was materialized with `Rc<()>` and is released once.
        unsafe { <Heap as Strategy<Rc<()>>>::release(&mut storage) };
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_heap_duplicate_is_deep() {
        let mut original = <Heap as Strategy<String>>::materialize(String::from("Circle"));

        // SAFETY: The storage was materialized with `String`.
        let copy = unsafe { <Heap as Strategy<String>>::duplicate(&original, Some(String::clone)) };
        let mut copy = copy.unwrap();
        assert_ne!(original.target(), copy.target());

        // SAFETY: The storage was materialized with `String`.
        let refused = unsafe { <Heap as Strategy<String>>::duplicate(&original, None) };
        assert!(refused.is_none());

        // SAFETY: Both storages were materialized with `String` and are released once.
        unsafe { <Heap as Strategy<String>>::release(&mut original) };
        // SAFETY: See above.
        unsafe { <Heap as Strategy<String>>::release(&mut copy) };
    }
}
