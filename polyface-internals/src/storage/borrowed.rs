//! Non-owning storages.
//!
//! Both strategies view a target owned by the caller. Releasing them never
//! touches the target.
//!
//! [`Borrowed`] views the target through a shared reference, so duplicating
//! it simply yields a second view of the same target. Any mutation the
//! target's capabilities perform has to go through interior mutability, and
//! it is visible through every view and through the original.
//!
//! [`BorrowedMut`] views the target through an exclusive reference. It allows
//! mutation through the erased value, and that mutation lands on the caller's
//! object, but it refuses to be duplicated since two exclusive views of one
//! target cannot coexist.

use core::{marker::PhantomData, ptr::NonNull};

use crate::{
    storage::{MutableStorage, Storage, StorageKind, Strategy},
    util::Erased,
};

/// Views a target through a `&'a T`.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct Borrowed<'a> {
    /// Pointer to the viewed target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer was created from a `&'a T` for some `T`.
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a Erased`
    _marker: PhantomData<&'a Erased>,
}

// SAFETY:
// 1. The pointer comes from a `&'a T`, which is valid for shared access for
//    as long as this object exists.
// 2. `Borrowed` does not implement `MutableStorage`.
// 3. `Borrowed` does not implement `Drop`.
unsafe impl Storage for Borrowed<'_> {
    const KIND: StorageKind = StorageKind::Borrowed;

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        self.ptr
    }
}

// SAFETY:
// 1. `materialize` records the address of the borrowed `T`.
// 2. `release` does nothing, since the caller owns the target.
// 3. `duplicate` records the same address, and releasing it does nothing
//    either.
unsafe impl<'a, T: 'static> Strategy<&'a T> for Borrowed<'a> {
    type Target = T;

    #[inline]
    fn materialize(value: &'a T) -> Self {
        Self {
            ptr: NonNull::from(value).cast::<Erased>(),
            _marker: PhantomData,
        }
    }

    #[inline]
    unsafe fn release(&mut self) {}

    #[inline]
    unsafe fn duplicate(&self, _copy: Option<fn(&T) -> T>) -> Option<Self> {
        Some(*self)
    }
}

/// Views a target through a `&'a mut T`.
#[repr(transparent)]
pub struct BorrowedMut<'a> {
    /// Pointer to the viewed target
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer was created from a `&'a mut T` for some `T`.
    /// 2. No other `BorrowedMut` holds the same pointer.
    ptr: NonNull<Erased>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a mut Erased`
    _marker: PhantomData<&'a mut Erased>,
}

// SAFETY:
// 1. The pointer comes from a `&'a mut T`, which is valid for shared and
//    exclusive access for as long as this object exists.
// 2. The pointer is unique, see below.
// 3. `BorrowedMut` does not implement `Drop`.
unsafe impl Storage for BorrowedMut<'_> {
    const KIND: StorageKind = StorageKind::BorrowedMut;

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        self.ptr
    }
}

// SAFETY: `duplicate` always refuses, so the exclusive borrow the storage was
// created from is never shared with another storage.
unsafe impl MutableStorage for BorrowedMut<'_> {}

// SAFETY:
// 1. `materialize` records the address of the borrowed `T`.
// 2. `release` does nothing, since the caller owns the target.
// 3. `duplicate` never produces a storage.
unsafe impl<'a, T: 'static> Strategy<&'a mut T> for BorrowedMut<'a> {
    type Target = T;

    #[inline]
    fn materialize(value: &'a mut T) -> Self {
        Self {
            ptr: NonNull::from(value).cast::<Erased>(),
            _marker: PhantomData,
        }
    }

    #[inline]
    unsafe fn release(&mut self) {}

    #[inline]
    unsafe fn duplicate(&self, _copy: Option<fn(&T) -> T>) -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;

    #[test]
    fn test_borrowed_views_the_callers_object() {
        let counter = Cell::new(0_u32);
        let mut view = <Borrowed<'_> as Strategy<&Cell<u32>>>::materialize(&counter);

        // SAFETY: The storage was materialized with `&Cell<u32>`.
        let alias = unsafe { <Borrowed<'_> as Strategy<&Cell<u32>>>::duplicate(&view, None) };
        let mut alias = alias.unwrap();
        assert_eq!(view.target(), alias.target());
        assert_eq!(view.target().cast::<Cell<u32>>(), NonNull::from(&counter));

        // SAFETY: The target is a `Cell<u32>` that outlives the view.
        unsafe { alias.target().cast::<Cell<u32>>().as_ref() }.set(3);

        // SAFETY: Both storages were materialized with `&Cell<u32>`.
        unsafe { <Borrowed<'_> as Strategy<&Cell<u32>>>::release(&mut view) };
        // SAFETY: See above.
        unsafe { <Borrowed<'_> as Strategy<&Cell<u32>>>::release(&mut alias) };
        assert_eq!(counter.get(), 3);
    }

    #[test]
    fn test_borrowed_mut_refuses_duplicates() {
        let mut value = 41_u32;
        let mut view = <BorrowedMut<'_> as Strategy<&mut u32>>::materialize(&mut value);

        // SAFETY: The storage was materialized with `&mut u32`.
        let alias = unsafe { <BorrowedMut<'_> as Strategy<&mut u32>>::duplicate(&view, Some(Clone::clone)) };
        assert!(alias.is_none());

        // SAFETY: The target is a `u32` that outlives the view, and the view is
        // the only path to it.
        unsafe { *view.target().cast::<u32>().as_mut() += 1 };

        // SAFETY: The storage was materialized with `&mut u32`.
        unsafe { <BorrowedMut<'_> as Strategy<&mut u32>>::release(&mut view) };
        assert_eq!(value, 42);
    }
}
