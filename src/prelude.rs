//! Commonly used items for convenient importing.
//!
//! ```
//! use polyface::prelude::*;
//!
//! struct Describe;
//!
//! impl Capability for Describe {
//!     const NAME: &'static str = "describe";
//!     type Receiver = ByRef;
//!     type Args<'a> = ();
//!     type Output = &'static str;
//! }
//!
//! impl Implementation<u8> for Describe {
//!     fn invoke<'a>(_: &'a u8, (): ()) -> &'static str {
//!         "a byte"
//!     }
//! }
//!
//! interface! { struct Described { Describe } }
//!
//! let value: Poly<Described, Shared> = Poly::new(7u8);
//! assert_eq!(value.call::<Describe>(()), "a byte");
//! ```

pub use crate::{
    Borrowed, BorrowedMut, Capability, Heap, IllegalCopy, Implementation, ImplementationMut,
    Inline, Interface, Poly, Satisfies, Sbo, Shared, Var, interface,
    markers::{ByMut, ByRef},
};
