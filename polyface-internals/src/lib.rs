#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`polyface`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased ownership machinery that
//! [`polyface`] builds its erased values on. It knows nothing about
//! interfaces or dispatch tables: it only knows how to keep a value of some
//! unknown type alive, hand out erased pointers to it, copy it and release
//! it.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`polyface`] crate, not this one.
//!
//! # Architecture
//!
//! - **[`storage`]**: Where an erased target lives
//!   - [`Storage`]: A place that yields a pointer to the target
//!   - [`Strategy`]: How a value of type `V` is materialized, copied and
//!     released in that place
//!   - [`Heap`], [`Inline`], [`Sbo`], [`Shared`], [`Borrowed`],
//!     [`BorrowedMut`]: The available strategies
//!
//! - **[`handle`]**: The owning handle
//!   - [`RawHandle`]: A storage plus the operations needed to release and copy
//!     whatever was materialized into it
//!   - [`RawTargetRef`]/[`RawTargetMut`]: Lifetime-bound erased pointers to
//!     the target
//!
//! - **[`policy`]**: Whether a target may be deep-copied
//!   - [`Copyable`]: Copies through [`Clone`]
//!   - [`MoveOnly`]: Refuses every deep copy
//!
//! # Safety Strategy
//!
//! A [`RawHandle<S>`] forgets the concrete target type once it has been
//! built. Every later operation on the storage must therefore be performed by
//! a function that was instantiated with the same target type that was used
//! to materialize it.
//!
//! This crate maintains that guarantee through:
//!
//! - **Module-based encapsulation**: The storage and its operations are
//!   module-private fields of [`RawHandle`], and they can only be created
//!   together by [`RawHandle::new`]
//! - **Documented strategy contracts**: Each [`Strategy`] method specifies
//!   exactly which storages it can be called on
//! - **Lifetime-carrying pointers**: [`RawTargetRef`] and [`RawTargetMut`]
//!   borrow the handle they came from, so they can never outlive the target
//!
//! [`polyface`]: https://docs.rs/polyface/latest/polyface/
//! [`Storage`]: storage::Storage
//! [`Strategy`]: storage::Strategy
//! [`Heap`]: storage::Heap
//! [`Inline`]: storage::Inline
//! [`Sbo`]: storage::Sbo
//! [`Shared`]: storage::Shared
//! [`Borrowed`]: storage::Borrowed
//! [`BorrowedMut`]: storage::BorrowedMut
//! [`RawHandle`]: handle::RawHandle
//! [`RawHandle<S>`]: handle::RawHandle
//! [`RawHandle::new`]: handle::RawHandle::new
//! [`RawTargetRef`]: handle::RawTargetRef
//! [`RawTargetMut`]: handle::RawTargetMut
//! [`Copyable`]: policy::Copyable
//! [`MoveOnly`]: policy::MoveOnly

extern crate alloc;

pub mod handle;
pub mod policy;
pub mod storage;
mod util;

pub use self::{
    handle::{RawHandle, RawTargetMut, RawTargetRef},
    policy::{CopyPolicy, Copyable, MoveOnly},
    storage::{
        Borrowed, BorrowedMut, Heap, INLINE_ALIGN, Inline, MutableStorage, Sbo, Shared, Storage,
        StorageKind, Strategy,
    },
    util::Erased,
};
