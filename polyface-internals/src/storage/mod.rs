//! Storage strategies for erased targets.
//!
//! A storage is the place an erased target lives. It is deliberately dumb: it
//! can hand out a pointer to the target, and nothing else. All operations
//! that need to know the concrete target type (materializing, copying and
//! releasing) are provided by [`Strategy`] and are only ever called through
//! the function pointers recorded in a [`RawHandle`].
//!
//! # Strategies
//!
//! | Strategy | Owns the target | Copy |
//! |---|---|---|
//! | [`Heap`] | yes, in a [`Box`] | deep copy through the copy policy |
//! | [`Inline<N>`] | yes, in an `N`-byte buffer | deep copy through the copy policy |
//! | [`Sbo<N>`] | yes, inline when it fits, on the heap otherwise | deep copy through the copy policy |
//! | [`Shared`] | shared, reference counted | increments the count |
//! | [`Borrowed`] | no, aliases a `&T` | aliases the same target |
//! | [`BorrowedMut`] | no, holds a `&mut T` | refused |
//!
//! # Safety Invariant
//!
//! Storages never implement [`Drop`]. A storage that was produced by
//! [`Strategy::materialize`] must be released exactly once with
//! [`Strategy::release`], instantiated with the same `V`. [`RawHandle`]
//! upholds this by recording the strategy's functions next to the storage.
//!
//! [`RawHandle`]: crate::handle::RawHandle
//! [`Box`]: alloc::boxed::Box

mod borrowed;
mod heap;
mod inline;
mod sbo;
mod shared;

use core::ptr::NonNull;

pub use self::{
    borrowed::{Borrowed, BorrowedMut},
    heap::Heap,
    inline::{INLINE_ALIGN, Inline},
    sbo::Sbo,
    shared::Shared,
};
use crate::util::Erased;

/// Identifies a storage strategy at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// The target is owned through a heap allocation.
    Heap,
    /// The target is owned inside a fixed-capacity buffer.
    Inline {
        /// Capacity of the buffer in bytes.
        capacity: usize,
    },
    /// The target is owned inline when it fits, on the heap otherwise.
    Sbo {
        /// Capacity of the inline buffer in bytes.
        capacity: usize,
    },
    /// The target is shared through a reference count.
    Shared,
    /// The target is borrowed immutably from the caller.
    Borrowed,
    /// The target is borrowed mutably from the caller.
    BorrowedMut,
}

impl StorageKind {
    /// Returns `true` if copying an erased value under this storage requires
    /// a deep copy of the target.
    pub const fn deep_copies(self) -> bool {
        matches!(self, Self::Heap | Self::Inline { .. } | Self::Sbo { .. })
    }

    /// Returns `true` if the target is owned (alone or shared) by the storage.
    pub const fn is_owning(self) -> bool {
        !matches!(self, Self::Borrowed | Self::BorrowedMut)
    }
}

impl core::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Heap => f.write_str("heap"),
            Self::Inline { capacity } => write!(f, "inline({capacity})"),
            Self::Sbo { capacity } => write!(f, "sbo({capacity})"),
            Self::Shared => f.write_str("shared"),
            Self::Borrowed => f.write_str("borrowed"),
            Self::BorrowedMut => f.write_str("borrowed-mut"),
        }
    }
}

/// A place that holds an erased target.
///
/// # Safety
///
/// Implementors must guarantee:
///
/// 1. For a storage produced by [`Strategy::materialize`] that has not yet
///    been released, [`Storage::target`] returns a pointer to the initialized
///    target, valid for shared access for as long as the storage is neither
///    moved, released nor mutably borrowed.
/// 2. If the implementor also implements [`MutableStorage`], the pointer is
///    additionally valid for exclusive access while the storage is mutably
///    borrowed.
/// 3. The storage does not implement [`Drop`].
pub unsafe trait Storage: Sized {
    /// The runtime identity of this strategy.
    const KIND: StorageKind;

    /// Returns an erased pointer to the target.
    fn target(&self) -> NonNull<Erased>;
}

/// A strategy for materializing values of type `V` into a storage.
///
/// `V` is what the caller hands over. For owning strategies it is the target
/// itself, for the borrowing strategies it is a reference to the target.
///
/// # Safety
///
/// Implementors must guarantee:
///
/// 1. [`Strategy::materialize`] returns a storage whose [`Storage::target`]
///    points to a `Self::Target`.
/// 2. [`Strategy::release`] ends the target's lifetime if and only if this
///    storage is its last owner, and leaves borrowed targets untouched.
/// 3. [`Strategy::duplicate`] returns a storage that can be released
///    independently of `self`.
pub unsafe trait Strategy<V>: Storage {
    /// The type of the target that ends up behind [`Storage::target`].
    type Target: 'static;

    /// Materializes a value into a fresh storage.
    fn materialize(value: V) -> Self;

    /// Releases the target held by this storage.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The storage was produced by [`Strategy::materialize`] or
    ///    [`Strategy::duplicate`] with this same `V`.
    /// 2. The storage has not been released before, and it is not used after
    ///    this call.
    unsafe fn release(&mut self);

    /// Produces a second storage for the same logical value.
    ///
    /// Owning strategies deep-copy the target with `copy`, and return `None`
    /// when `copy` is `None`. Shared and borrowing strategies ignore `copy`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The storage was produced by [`Strategy::materialize`] or
    ///    [`Strategy::duplicate`] with this same `V`, and has not been
    ///    released.
    unsafe fn duplicate(&self, copy: Option<fn(&Self::Target) -> Self::Target>) -> Option<Self>;

    /// Returns the number of storages sharing the target, for strategies that
    /// share.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The storage was produced by [`Strategy::materialize`] or
    ///    [`Strategy::duplicate`] with this same `V`, and has not been
    ///    released.
    #[inline]
    unsafe fn share_count(&self) -> Option<usize> {
        None
    }
}

/// A storage through which the target may be mutated.
///
/// # Safety
///
/// Implementors must guarantee that no other storage reaches the same target
/// while a mutable borrow of this storage is alive.
pub unsafe trait MutableStorage: Storage {}
