//! Internal utility types.

/// Marker type used when type-erasing a stored target.
///
/// This zero-sized type serves as the pointee of every erased pointer handed
/// out by a [`Storage`]. A `NonNull<Erased>` points at a target whose concrete
/// type is unknown in the current scope, and it must be cast back to the real
/// type before it is dereferenced.
///
/// Using a distinct marker type (rather than `()` or `u8`) makes the intent
/// clearer in type signatures and error messages.
///
/// [`Storage`]: crate::storage::Storage
#[derive(Debug)]
pub struct Erased {
    /// Keeps the type unconstructible outside this crate.
    _private: (),
}
