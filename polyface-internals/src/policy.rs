//! Copy policies.
//!
//! An owning storage that deep-copies its target needs a way to produce a
//! second target from the first. Whether such a way exists is decided when
//! the value is stored, by picking one of the policies below. The decision is
//! baked into the [`RawHandle`] and consulted every time the handle is
//! duplicated.
//!
//! [`RawHandle`]: crate::handle::RawHandle

/// Decides how a target of type `T` is deep-copied.
pub trait CopyPolicy<T>: 'static {
    /// The function used to deep-copy a target, or `None` when the target
    /// cannot be copied.
    const COPY: Option<fn(&T) -> T>;
}

/// Deep-copies targets through their [`Clone`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Copyable;

/// Refuses to deep-copy targets.
///
/// Storages that share or alias their target can still be duplicated, since
/// they never need to copy the target itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MoveOnly;

impl<T: Clone> CopyPolicy<T> for Copyable {
    const COPY: Option<fn(&T) -> T> = Some(T::clone);
}

impl<T> CopyPolicy<T> for MoveOnly {
    const COPY: Option<fn(&T) -> T> = None;
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_copyable_clones() {
        let copy = <Copyable as CopyPolicy<String>>::COPY.unwrap();
        assert_eq!(copy(&String::from("Square")), "Square");
    }

    #[test]
    fn test_move_only_has_no_copy() {
        assert!(<MoveOnly as CopyPolicy<String>>::COPY.is_none());
        assert!(<MoveOnly as CopyPolicy<u8>>::COPY.is_none());
    }
}
