//! Marker types for receivers and copy policies.
//!
//! These markers never exist at runtime. They are used as associated types
//! and generic parameters to encode, at compile time, how a capability
//! borrows its target and whether an erased value may deep-copy its target.
//!
//! # Receiver Markers
//!
//! Every [`Capability`](crate::Capability) names the kind of borrow its
//! implementations take on the target:
//!
//! - [`ByRef`]: The capability borrows the target immutably. It is invoked
//!   with [`Poly::call`](crate::Poly::call) and implemented through
//!   [`Implementation`](crate::Implementation).
//! - [`ByMut`]: The capability borrows the target mutably. It is invoked with
//!   [`Poly::call_mut`](crate::Poly::call_mut), which is only available on
//!   storages that allow mutation, and implemented through
//!   [`ImplementationMut`](crate::ImplementationMut).
//!
//! # Copy Policies
//!
//! An owning storage that deep-copies needs to know how to copy the target.
//! The policy is picked by the constructor:
//!
//! - [`Copyable`]: Picked by [`Poly::new`](crate::Poly::new). The target is
//!   copied through [`Clone`].
//! - [`MoveOnly`]: Picked by [`Poly::new_move_only`](crate::Poly::new_move_only).
//!   Deep copies are refused with an [`IllegalCopy`](crate::IllegalCopy)
//!   error. Storages that share or alias their target still copy fine.
//!
//! # Examples
//!
//! ```
//! use polyface::{Capability, markers::{ByMut, ByRef}};
//!
//! struct Area;
//!
//! impl Capability for Area {
//!     const NAME: &'static str = "area";
//!     type Receiver = ByRef;
//!     type Args<'a> = ();
//!     type Output = f64;
//! }
//!
//! struct Grow;
//!
//! impl Capability for Grow {
//!     const NAME: &'static str = "grow";
//!     type Receiver = ByMut;
//!     type Args<'a> = f64;
//!     type Output = ();
//! }
//! ```

pub use polyface_internals::{CopyPolicy, Copyable, MoveOnly};

/// Marker for capabilities that borrow their target immutably.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByRef;

/// Marker for capabilities that borrow their target mutably.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ByMut;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::ByRef {}
    impl Sealed for super::ByMut {}
}

/// The kind of borrow a capability takes on its target.
///
/// This trait is sealed and implemented for [`ByRef`] and [`ByMut`] only.
pub trait Receiver: sealed::Sealed + 'static {
    /// Whether the capability needs exclusive access to the target.
    const EXCLUSIVE: bool;
}

impl Receiver for ByRef {
    const EXCLUSIVE: bool = false;
}

impl Receiver for ByMut {
    const EXCLUSIVE: bool = true;
}
