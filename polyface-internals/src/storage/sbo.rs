//! Small-buffer storage.
//!
//! Targets that fit into an [`Inline<N>`] buffer are stored inline, all
//! others fall back to a [`Heap`] allocation. Unlike [`Inline<N>`], this
//! strategy accepts every target.

use core::ptr::NonNull;

use crate::{
    storage::{Heap, Inline, MutableStorage, Storage, StorageKind, Strategy},
    util::Erased,
};

/// Owns its target inline when it fits into `N` bytes, on the heap otherwise.
pub struct Sbo<const N: usize> {
    /// Where the target ended up.
    repr: Repr<N>,
}

/// The two places an [`Sbo`] target can live.
enum Repr<const N: usize> {
    /// The target fits into the buffer.
    Inline(Inline<N>),
    /// The target was too large or too strictly aligned.
    Heap(Heap),
}

impl<const N: usize> Sbo<N> {
    /// Returns `true` if the target lives in the inline buffer.
    #[inline]
    pub fn is_inline(&self) -> bool {
        matches!(self.repr, Repr::Inline(_))
    }
}

// SAFETY: Both variants uphold the `Storage` contract, and `Sbo` only
// forwards to them. `Sbo` does not implement `Drop`.
unsafe impl<const N: usize> Storage for Sbo<N> {
    const KIND: StorageKind = StorageKind::Sbo { capacity: N };

    #[inline]
    fn target(&self) -> NonNull<Erased> {
        match &self.repr {
            Repr::Inline(inline) => inline.target(),
            Repr::Heap(heap) => heap.target(),
        }
    }
}

// SAFETY: Both variants own their target exclusively.
unsafe impl<const N: usize> MutableStorage for Sbo<N> {}

// SAFETY: `materialize` picks the variant once, and every later operation is
// forwarded to the strategy of the variant that was picked, instantiated with
// the same `T`.
unsafe impl<const N: usize, T: 'static> Strategy<T> for Sbo<N> {
    type Target = T;

    #[inline]
    fn materialize(value: T) -> Self {
        // `Inline::materialize` is not used here: its capacity assertion would
        // reject every large `T`, even on the branch that is never taken.
        let repr = if Inline::<N>::fits::<T>() {
            // SAFETY:
            // 1. We just checked that `T` fits.
            Repr::Inline(unsafe { Inline::write_unchecked(value) })
        } else {
            Repr::Heap(<Heap as Strategy<T>>::materialize(value))
        };
        Self { repr }
    }

    #[inline]
    unsafe fn release(&mut self) {
        match &mut self.repr {
            // SAFETY: Guaranteed by the caller, the variant was materialized
            // with `T`.
            Repr::Inline(inline) => unsafe { <Inline<N> as Strategy<T>>::release(inline) },
            // SAFETY: Guaranteed by the caller, the variant was materialized
            // with `T`.
            Repr::Heap(heap) => unsafe { <Heap as Strategy<T>>::release(heap) },
        }
    }

    #[inline]
    unsafe fn duplicate(&self, copy: Option<fn(&T) -> T>) -> Option<Self> {
        let repr = match &self.repr {
            // SAFETY: Guaranteed by the caller, the variant was materialized
            // with `T`.
            Repr::Inline(inline) => {
                Repr::Inline(unsafe { <Inline<N> as Strategy<T>>::duplicate(inline, copy) }?)
            }
            // SAFETY: Guaranteed by the caller, the variant was materialized
            // with `T`.
            Repr::Heap(heap) => Repr::Heap(unsafe { <Heap as Strategy<T>>::duplicate(heap, copy) }?),
        };
        Some(Self { repr })
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_sbo_picks_inline_for_small_targets() {
        let mut storage = <Sbo<16> as Strategy<u64>>::materialize(7);
        assert!(storage.is_inline());

        // SAFETY: The storage holds a `u64`.
        assert_eq!(unsafe { *storage.target().cast::<u64>().as_ref() }, 7);

        // SAFETY: The storage was materialized with `u64` and is released once.
        unsafe { <Sbo<16> as Strategy<u64>>::release(&mut storage) };
    }

    #[test]
    fn test_sbo_falls_back_to_heap() {
        let mut storage = <Sbo<4> as Strategy<[u64; 8]>>::materialize([3; 8]);
        assert!(!storage.is_inline());

        // SAFETY: The storage was materialized with `[u64; 8]`.
        let copy = unsafe { <Sbo<4> as Strategy<[u64; 8]>>::duplicate(&storage, Some(Clone::clone)) };
        let mut copy = copy.unwrap();
        assert!(!copy.is_inline());

        // SAFETY: The copy holds a `[u64; 8]`.
        assert_eq!(unsafe { copy.target().cast::<[u64; 8]>().as_ref() }, &[3; 8]);

        // SAFETY: Both storages were materialized with `[u64; 8]` and are released once.
        unsafe { <Sbo<4> as Strategy<[u64; 8]>>::release(&mut storage) };
        // SAFETY: See above.
        unsafe { <Sbo<4> as Strategy<[u64; 8]>>::release(&mut copy) };
    }

    #[test]
    fn test_sbo_duplicate_refused_without_copy() {
        let mut storage = <Sbo<64> as Strategy<String>>::materialize(String::from("Circle"));

        // SAFETY: The storage was materialized with `String`.
        let copy = unsafe { <Sbo<64> as Strategy<String>>::duplicate(&storage, None) };
        assert!(copy.is_none());

        // SAFETY: The storage was materialized with `String` and is released once.
        unsafe { <Sbo<64> as Strategy<String>>::release(&mut storage) };
    }
}
