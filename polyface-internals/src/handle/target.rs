//! Lifetime-bound erased pointers to a handle's target.
//!
//! This module encapsulates the `ptr` fields of [`RawTargetRef`] and
//! [`RawTargetMut`]. They can only be created by the [`RawHandle`] that owns
//! (or views) the target, which ties their lifetime to a borrow of that
//! handle.
//!
//! [`RawHandle`]: crate::handle::RawHandle

use core::{marker::PhantomData, ptr::NonNull};

use crate::util::Erased;

/// A lifetime-bound pointer to an initialized target of some type `T`,
/// though we do not know which actual `T` it is.
///
/// We cannot use a `&'a T` directly, because that would require us to know
/// the actual type of the target, which we do not.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawTargetRef<'a> {
    /// Pointer to the target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer points to an initialized target that is valid for
    ///    shared access for the lifetime `'a`.
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a Erased`
    _marker: PhantomData<&'a Erased>,
}

impl<'a> RawTargetRef<'a> {
    /// Creates a new [`RawTargetRef`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized target that is valid for shared
    ///    access for the lifetime `'a`.
    #[inline]
    pub(super) unsafe fn new(ptr: NonNull<Erased>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Casts the [`RawTargetRef`] back to a reference to the concrete target.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual type of the target.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a T {
        let this = self.ptr.cast::<T>();
        // SAFETY: Converting the NonNull pointer to a reference is sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawTargetRef's type invariants)
        // - The pointee is properly initialized and valid for shared access for
        //   `'a` (guaranteed by RawTargetRef's type invariants)
        // - The type `T` matches the actual target type (guaranteed by caller)
        unsafe { this.as_ref() }
    }

    /// Returns the erased pointer to the target.
    #[inline]
    pub fn as_ptr(self) -> *const Erased {
        self.ptr.as_ptr()
    }
}

/// A lifetime-bound exclusive pointer to an initialized target of some type
/// `T`, though we do not know which actual `T` it is.
///
/// We cannot use a `&'a mut T` directly, because that would require us to
/// know the actual type of the target, which we do not.
#[repr(transparent)]
pub struct RawTargetMut<'a> {
    /// Pointer to the target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer points to an initialized target that is valid for
    ///    exclusive access for the lifetime `'a`.
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut Erased`
    _marker: PhantomData<&'a mut Erased>,
}

impl<'a> RawTargetMut<'a> {
    /// Creates a new [`RawTargetMut`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` points to an initialized target that is valid for exclusive
    ///    access for the lifetime `'a`.
    #[inline]
    pub(super) unsafe fn new(ptr: NonNull<Erased>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// Casts the [`RawTargetMut`] back to a mutable reference to the concrete
    /// target.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual type of the target.
    #[inline]
    pub unsafe fn downcast_unchecked<T: 'static>(self) -> &'a mut T {
        let mut this = self.ptr.cast::<T>();
        // SAFETY: Converting the NonNull pointer to a mutable reference is sound
        // because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawTargetMut's type invariants)
        // - The pointee is properly initialized and valid for exclusive access for
        //   `'a` (guaranteed by RawTargetMut's type invariants)
        // - The type `T` matches the actual target type (guaranteed by caller)
        unsafe { this.as_mut() }
    }

    /// Reborrows the [`RawTargetMut`] for a shorter lifetime.
    #[inline]
    pub fn reborrow<'b>(&'b mut self) -> RawTargetMut<'b> {
        RawTargetMut {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Turns the exclusive pointer into a shared one.
    #[inline]
    pub fn into_ref(self) -> RawTargetRef<'a> {
        RawTargetRef {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }

    /// Returns the erased pointer to the target.
    #[inline]
    pub fn as_ptr(&self) -> *mut Erased {
        self.ptr.as_ptr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_target_sizes() {
        assert_eq!(
            core::mem::size_of::<RawTargetRef<'_>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<Option<RawTargetRef<'_>>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawTargetMut<'_>>(),
            core::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_raw_target_mut_reborrow() {
        let mut value = 1_u8;
        // SAFETY: `value` is valid for exclusive access while `target` is alive.
        let mut target = unsafe { RawTargetMut::new(NonNull::from(&mut value).cast::<Erased>()) };

        // SAFETY: The target is a `u8`.
        *unsafe { target.reborrow().downcast_unchecked::<u8>() } += 1;

        // SAFETY: The target is a `u8`.
        let shared = unsafe { target.into_ref().downcast_unchecked::<u8>() };
        assert_eq!(*shared, 2);
    }

    #[test]
    fn test_raw_target_not_send_sync() {
        static_assertions::assert_not_impl_any!(RawTargetRef<'static>: Send, Sync);
        static_assertions::assert_not_impl_any!(RawTargetMut<'static>: Send, Sync);
    }
}
