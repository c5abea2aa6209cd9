//! Capabilities and the thunks that invoke them on erased targets.
//!
//! A capability is a zero-sized type that names one operation an interface
//! can require, together with its receiver kind, argument type and output
//! type. Concrete types opt into a capability by having the capability
//! implement [`Implementation`] (or [`ImplementationMut`]) for them, which
//! keeps the capability, not the concrete type, on the implementing side:
//!
//! ```
//! use polyface::{Capability, Implementation, markers::ByRef};
//!
//! struct Square;
//! struct Circle;
//!
//! struct Draw;
//!
//! impl Capability for Draw {
//!     const NAME: &'static str = "draw";
//!     type Receiver = ByRef;
//!     type Args<'a> = &'a mut String;
//!     type Output = ();
//! }
//!
//! impl Implementation<Square> for Draw {
//!     fn invoke<'a>(_: &'a Square, out: &'a mut String) {
//!         out.push_str("Square");
//!     }
//! }
//!
//! // Implementations do not need to call a method on the target.
//! fn draw_circle(out: &mut String) {
//!     out.push_str("Circle");
//! }
//!
//! impl Implementation<Circle> for Draw {
//!     fn invoke<'a>(_: &'a Circle, out: &'a mut String) {
//!         draw_circle(out);
//!     }
//! }
//! ```
//!
//! Two capabilities that share a [`Capability::NAME`] occupy the same slot
//! when they are declared by the same interface chain. Overloads therefore
//! need distinct names.

use core::any::TypeId;

use polyface_internals::{RawTargetMut, RawTargetRef};

use crate::{
    markers::{ByMut, ByRef, Receiver},
    table::{TableBuilder, Thunk},
};

/// An operation that an interface can require from its targets.
pub trait Capability: 'static {
    /// The name of the capability.
    ///
    /// Capabilities are laid out in slots by name: an interface that declares
    /// a capability with the same name as one of its base interfaces
    /// overrides the base's slot.
    const NAME: &'static str;

    /// Whether the capability borrows its target immutably ([`ByRef`]) or
    /// mutably ([`ByMut`]).
    type Receiver: Receiver;

    /// The arguments passed to the capability on every call.
    type Args<'a>;

    /// The value returned by the capability.
    type Output;
}

/// Provides a [`ByRef`] capability for targets of type `T`.
#[diagnostic::on_unimplemented(
    message = "`{T}` does not provide the `{Self}` capability",
    label = "`{Self}` is not implemented for `{T}`",
    note = "implement `Implementation<{T}>` for `{Self}` to provide it"
)]
pub trait Implementation<T: 'static>: Capability<Receiver = ByRef> {
    /// Invokes the capability on `target`.
    fn invoke<'a>(target: &'a T, args: Self::Args<'a>) -> Self::Output;
}

/// Provides a [`ByMut`] capability for targets of type `T`.
#[diagnostic::on_unimplemented(
    message = "`{T}` does not provide the `{Self}` capability",
    label = "`{Self}` is not implemented for `{T}`",
    note = "implement `ImplementationMut<{T}>` for `{Self}` to provide it"
)]
pub trait ImplementationMut<T: 'static>: Capability<Receiver = ByMut> {
    /// Invokes the capability on `target`.
    fn invoke_mut<'a>(target: &'a mut T, args: Self::Args<'a>) -> Self::Output;
}

/// The thunk stored in a dispatch table for a [`ByRef`] capability.
pub type SharedThunk<C> = for<'a> unsafe fn(
    RawTargetRef<'a>,
    <C as Capability>::Args<'a>,
) -> <C as Capability>::Output;

/// The thunk stored in a dispatch table for a [`ByMut`] capability.
pub type ExclusiveThunk<C> = for<'a> unsafe fn(
    RawTargetMut<'a>,
    <C as Capability>::Args<'a>,
) -> <C as Capability>::Output;

/// Casts the erased target back to `T` and forwards to the implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The target behind `target` is a `T`.
unsafe fn invoke_shared<'a, C, T>(target: RawTargetRef<'a>, args: C::Args<'a>) -> C::Output
where
    C: Implementation<T>,
    T: 'static,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let target: &'a T = unsafe { target.downcast_unchecked::<T>() };
    C::invoke(target, args)
}

/// Casts the erased target back to `T` and forwards to the implementation.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. The target behind `target` is a `T`.
unsafe fn invoke_exclusive<'a, C, T>(target: RawTargetMut<'a>, args: C::Args<'a>) -> C::Output
where
    C: ImplementationMut<T>,
    T: 'static,
{
    // SAFETY:
    // 1. Guaranteed by the caller
    let target: &'a mut T = unsafe { target.downcast_unchecked::<T>() };
    C::invoke_mut(target, args)
}

/// Produces the dispatch-table entry of capability `C` for targets of type
/// `T`.
///
/// This is implemented on the receiver markers rather than on the
/// capabilities, so that both receiver kinds can have a blanket
/// implementation.
#[diagnostic::on_unimplemented(
    message = "`{T}` does not provide the `{C}` capability",
    label = "required by an interface that `{T}` is erased as",
    note = "implement `Implementation<{T}>` (or `ImplementationMut<{T}>`) for `{C}` to provide it"
)]
pub trait Install<C: Capability, T: 'static>: Receiver {
    /// Returns the thunk invoking `C` on a `T`.
    fn thunk() -> Thunk;
}

impl<C: Implementation<T>, T: 'static> Install<C, T> for ByRef {
    #[inline]
    fn thunk() -> Thunk {
        Thunk::new::<C, SharedThunk<C>>(const { &(invoke_shared::<C, T> as SharedThunk<C>) })
    }
}

impl<C: ImplementationMut<T>, T: 'static> Install<C, T> for ByMut {
    #[inline]
    fn thunk() -> Thunk {
        Thunk::new::<C, ExclusiveThunk<C>>(const {
            &(invoke_exclusive::<C, T> as ExclusiveThunk<C>)
        })
    }
}

/// The ordered list of capabilities an interface declares.
///
/// Implemented for tuples of up to twelve capabilities, and for `()`.
pub trait CapabilityList: 'static {
    /// The names of the capabilities, in declaration order.
    const NAMES: &'static [&'static str];

    /// Returns the [`TypeId`]s of the capabilities, in declaration order.
    fn type_ids() -> alloc::vec::Vec<TypeId>;
}

/// A [`CapabilityList`] whose every capability is provided for `T`.
pub trait SatisfiedBy<T: 'static>: CapabilityList {
    /// Installs the thunks of every capability into `builder`.
    fn install(builder: &mut TableBuilder<'_>);
}

impl CapabilityList for () {
    const NAMES: &'static [&'static str] = &[];

    fn type_ids() -> alloc::vec::Vec<TypeId> {
        alloc::vec::Vec::new()
    }
}

impl<T: 'static> SatisfiedBy<T> for () {
    #[inline]
    fn install(_builder: &mut TableBuilder<'_>) {}
}

macro_rules! capability_tuples {
    ($($cap:ident),+) => {
        impl<$($cap: Capability),+> CapabilityList for ($($cap,)+) {
            const NAMES: &'static [&'static str] = &[$($cap::NAME),+];

            fn type_ids() -> alloc::vec::Vec<TypeId> {
                alloc::vec![$(TypeId::of::<$cap>()),+]
            }
        }

        impl<T: 'static, $($cap),+> SatisfiedBy<T> for ($($cap,)+)
        where
            $($cap: Capability, <$cap as Capability>::Receiver: Install<$cap, T>,)+
        {
            #[inline]
            fn install(builder: &mut TableBuilder<'_>) {
                $(builder.install(<<$cap as Capability>::Receiver as Install<$cap, T>>::thunk());)+
            }
        }
    };
}

capability_tuples!(C1);
capability_tuples!(C1, C2);
capability_tuples!(C1, C2, C3);
capability_tuples!(C1, C2, C3, C4);
capability_tuples!(C1, C2, C3, C4, C5);
capability_tuples!(C1, C2, C3, C4, C5, C6);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7, C8);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7, C8, C9);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7, C8, C9, C10);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11);
capability_tuples!(C1, C2, C3, C4, C5, C6, C7, C8, C9, C10, C11, C12);

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    struct Name;

    impl Capability for Name {
        const NAME: &'static str = "name";
        type Receiver = ByRef;
        type Args<'a> = ();
        type Output = &'static str;
    }

    struct Bump;

    impl Capability for Bump {
        const NAME: &'static str = "bump";
        type Receiver = ByMut;
        type Args<'a> = u32;
        type Output = u32;
    }

    struct Counter(u32);

    impl Implementation<Counter> for Name {
        fn invoke<'a>(_: &'a Counter, (): ()) -> &'static str {
            "Counter"
        }
    }

    impl ImplementationMut<Counter> for Bump {
        fn invoke_mut<'a>(target: &'a mut Counter, by: u32) -> u32 {
            target.0 += by;
            target.0
        }
    }

    #[test]
    fn test_capability_list_names() {
        assert_eq!(<() as CapabilityList>::NAMES, &[] as &[&str]);
        assert_eq!(<(Name,) as CapabilityList>::NAMES, &["name"]);
        assert_eq!(<(Name, Bump) as CapabilityList>::NAMES, &["name", "bump"]);
        assert_eq!(
            <(Name, Bump) as CapabilityList>::type_ids(),
            [TypeId::of::<Name>(), TypeId::of::<Bump>()]
        );
    }

    #[test]
    fn test_thunks_are_shared_per_instantiation() {
        let first = <ByRef as Install<Name, Counter>>::thunk();
        let second = <ByRef as Install<Name, Counter>>::thunk();
        assert!(first.same_entry(&second));
        assert_eq!(first.name(), "name");

        let bump = <ByMut as Install<Bump, Counter>>::thunk();
        assert!(!first.same_entry(&bump));
        assert_eq!(bump.capability_type_id(), TypeId::of::<Bump>());
    }

    #[test]
    fn test_receiver_markers() {
        assert!(!<ByRef as Receiver>::EXCLUSIVE);
        assert!(<ByMut as Receiver>::EXCLUSIVE);
        static_assertions::assert_impl_all!((Name, Bump): SatisfiedBy<Counter>);
        static_assertions::assert_not_impl_any!((Name,): SatisfiedBy<String>);
    }
}
