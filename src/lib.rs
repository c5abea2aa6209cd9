#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Non-intrusive runtime polymorphism.
//!
//! ## Overview
//!
//! This crate lets you call a common set of operations on values of
//! unrelated types, without those types implementing a shared trait and
//! without boxing them as trait objects. The operations are described by an
//! [`Interface`], a declared list of [`Capability`]s. Any type that provides
//! every capability of an interface can be erased into a [`Poly`] of that
//! interface, and the erased value is then called through a dispatch table
//! that is shared by all values of the same type.
//!
//! Where the target lives is a separate decision, made by the storage
//! strategy of the [`Poly`]: on the heap ([`Heap`], the default), in a
//! fixed inline buffer ([`Inline`]), inline when small ([`Sbo`]), behind a
//! reference count ([`Shared`]) or borrowed from the caller ([`Borrowed`],
//! [`BorrowedMut`]).
//!
//! ## Quick Example
//!
//! ```
//! use polyface::{Capability, Implementation, Poly, markers::ByRef};
//!
//! /// Writes the name of a shape.
//! struct Draw;
//!
//! impl Capability for Draw {
//!     const NAME: &'static str = "draw";
//!     type Receiver = ByRef;
//!     type Args<'a> = &'a mut String;
//!     type Output = ();
//! }
//!
//! struct Square;
//! struct Circle;
//! struct Triangle;
//!
//! impl Implementation<Square> for Draw {
//!     fn invoke<'a>(_: &'a Square, out: &'a mut String) {
//!         out.push_str("Square");
//!     }
//! }
//!
//! impl Implementation<Circle> for Draw {
//!     fn invoke<'a>(_: &'a Circle, out: &'a mut String) {
//!         out.push_str("Circle");
//!     }
//! }
//!
//! impl Implementation<Triangle> for Draw {
//!     fn invoke<'a>(_: &'a Triangle, out: &'a mut String) {
//!         out.push_str("Triangle");
//!     }
//! }
//!
//! polyface::interface! {
//!     /// Shapes that can be drawn.
//!     struct Drawable { Draw }
//! }
//!
//! let shapes: Vec<Poly<Drawable>> = vec![
//!     Poly::new_move_only(Square),
//!     Poly::new_move_only(Circle),
//!     Poly::new_move_only(Triangle),
//! ];
//!
//! let mut out = String::new();
//! for shape in &shapes {
//!     shape.call::<Draw>(&mut out);
//! }
//! assert_eq!(out, "SquareCircleTriangle");
//! ```
//!
//! ## Compile-Time Checks
//!
//! Most mistakes are rejected by the compiler:
//!
//! - Erasing a type that lacks a capability of the interface fails the
//!   [`Satisfies`] bound, with a message naming the missing capability.
//! - Storing a type that does not fit an [`Inline`] buffer fails a constant
//!   assertion.
//! - Calling a capability that the interface does not declare fails the
//!   constant evaluation of [`slot_index`].
//! - Declaring two capabilities with the same name in one interface fails
//!   the same constant evaluation.
//! - Asking [`Poly::call_as`] for an output type the capability's output
//!   does not convert into fails the [`Into`] bound.
//!
//! What is left for runtime is copying: [`Poly::try_clone`] reports an
//! [`IllegalCopy`] when the storage would need to deep-copy a target that
//! was stored with [`Poly::new_move_only`].
//!
//! ## Extension
//!
//! An interface may extend another one. The base's slots keep their indices,
//! new capabilities are appended, and a capability named like one of the
//! base's overrides it for the derived interface only. The base's own
//! capability stays callable and keeps the base's behaviour. The resulting
//! layout can be inspected through the [`registry`].
//!
//! ## Features
//!
//! - `std`: Uses `std::sync::RwLock` for the registries instead of a spin
//!   lock, and enables the `std` features of `rootcause` and `tracing`.
//!
//! ## Logging
//!
//! Building layouts and dispatch tables is logged at the `debug` level,
//! erasing and copying values at the `trace` level, through [`tracing`].
//!
//! [`tracing`]: https://docs.rs/tracing

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

pub mod capability;
mod error;
pub mod interface;
pub mod markers;
mod poly;
pub mod prelude;
pub mod registry;
pub mod table;
mod var;

pub use polyface_internals::{
    Borrowed, BorrowedMut, Heap, INLINE_ALIGN, Inline, MutableStorage, Sbo, Shared, Storage,
    StorageKind, Strategy,
};

pub use self::{
    capability::{Capability, Implementation, ImplementationMut},
    error::IllegalCopy,
    interface::{Interface, Satisfies, slot_index},
    poly::Poly,
    table::DispatchTable,
    var::Var,
};
