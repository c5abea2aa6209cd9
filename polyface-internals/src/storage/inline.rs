//! Inline-buffer storage.
//!
//! The target is constructed in place inside a fixed-size, over-aligned
//! buffer that lives wherever the storage lives. Moving the storage moves the
//! target with it, which is always fine in Rust since no value can rely on
//! its own address.
//!
//! # Capacity
//!
//! [`Strategy::materialize`] refuses, at compile time, every target whose
//! size exceeds `N` or whose alignment exceeds [`INLINE_ALIGN`]:
//!
//! ```compile_fail
//! use polyface_internals::{Inline, Strategy};
//!
//! let _ = <Inline<4> as Strategy<[u64; 2]>>::materialize([1, 2]);
//! ```

use core::{cell::UnsafeCell, mem::MaybeUninit, ptr::NonNull};

use crate::{
    storage::{MutableStorage, Storage, StorageKind, Strategy},
    util::Erased,
};

/// Alignment of the buffer used by [`Inline`].
pub const INLINE_ALIGN: usize = 16;

/// Owns its target inside an `N`-byte buffer aligned to [`INLINE_ALIGN`].
#[repr(C, align(16))]
pub struct Inline<const N: usize> {
    /// The buffer the target is constructed in
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The buffer holds an initialized `T` for some `T` with
    ///    `size_of::<T>() <= N` and `align_of::<T>() <= INLINE_ALIGN`, until
    ///    [`Strategy::release`] is called.
    buffer: UnsafeCell<MaybeUninit<[u8; N]>>,
}

impl<const N: usize> Inline<N> {
    /// Returns `true` if a `T` fits into the buffer.
    #[inline]
    pub const fn fits<T>() -> bool {
        size_of::<T>() <= N && align_of::<T>() <= INLINE_ALIGN
    }

    /// Constructs `value` into a fresh buffer without checking that it fits.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `Self::fits::<T>()` is `true`.
    #[inline]
    pub(super) unsafe fn write_unchecked<T>(value: T) -> Self {
        let this = Self {
            buffer: UnsafeCell::new(MaybeUninit::uninit()),
        };
        let slot: *mut T = this.buffer.get().cast::<T>();

        // SAFETY:
        // 1. The buffer is large enough and sufficiently aligned for a `T`
        //    (guaranteed by the caller), so `slot` is valid for writes.
        // 2. The buffer is uninitialized, so nothing is overwritten.
        unsafe { slot.write(value) };

        this
    }
}

// SAFETY:
// 1. The pointer is derived from the `UnsafeCell` and so allows both shared
//    and exclusive access. It stays valid as long as the storage is not moved,
//    which the borrow of `self` guarantees.
// 2. Each `Inline` owns its own buffer.
// 3. `Inline` does not implement `Drop`.
unsafe impl<const N: usize> Storage for Inline<N> {
    const KIND: StorageKind = StorageKind::Inline { capacity: N };

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        NonNull::from(&self.buffer).cast::<Erased>()
    }
}

// SAFETY: Every `Inline` owns its buffer, so mutably borrowing one storage
// cannot alias a target reached through another.
unsafe impl<const N: usize> MutableStorage for Inline<N> {}

// SAFETY:
// 1. `materialize` constructs a `T` in the buffer.
// 2. `release` drops the `T` in place, and the buffer is its only owner.
// 3. `duplicate` constructs a fresh copy in a new buffer.
unsafe impl<const N: usize, T: 'static> Strategy<T> for Inline<N> {
    type Target = T;

    #[inline]
    fn materialize(value: T) -> Self {
        const {
            assert!(
                Self::fits::<T>(),
                "the target does not fit into the inline buffer"
            );
        }

        // SAFETY:
        // 1. The assertion above guarantees that `T` fits.
        unsafe { Self::write_unchecked(value) }
    }

    #[inline]
    unsafe fn release(&mut self) {
        let slot: *mut T = self.buffer.get_mut().as_mut_ptr().cast::<T>();

        // SAFETY:
        // 1. The caller guarantees that the buffer holds an initialized `T`
        //    that has not been released before.
        // 2. We hold `&mut self`, so nothing else observes the target while it
        //    is dropped.
        unsafe { slot.drop_in_place() };
    }

    #[inline]
    unsafe fn duplicate(&self, copy: Option<fn(&T) -> T>) -> Option<Self> {
        let copy = copy?;

        // SAFETY:
        // 1. The caller guarantees that the buffer holds an initialized `T`.
        // 2. Shared access is allowed, since we only hold `&self`.
        let target: &T = unsafe { self.target().cast::<T>().as_ref() };
        let value = copy(target);

        // SAFETY:
        // 1. A `T` already lives in a buffer of this size, so it fits.
        Some(unsafe { Self::write_unchecked(value) })
    }
}
