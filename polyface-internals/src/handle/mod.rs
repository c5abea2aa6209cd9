//! The type-erased owning handle and erased pointers into it.
//!
//! - [`RawHandle`]: A storage plus the operations that know the concrete
//!   target type
//! - [`RawTargetRef`]/[`RawTargetMut`]: Borrowed erased pointers to the target,
//!   which dispatch thunks cast back to the concrete type

mod ops;
mod raw;
mod target;

pub use self::{
    raw::RawHandle,
    target::{RawTargetMut, RawTargetRef},
};
