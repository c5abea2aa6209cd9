//! Interfaces, extension chains and the structural check.
//!
//! An [`Interface`] declares an ordered list of capabilities and optionally
//! the interface it extends. The slot layout follows from that declaration
//! alone:
//!
//! 1. The slots of the base interface come first, at unchanged indices.
//! 2. A declared capability whose name is already laid out by the base
//!    reuses that slot, overriding the base's capability in the derived
//!    interface only. Calls of the base's capability still reach the base's
//!    implementation.
//! 3. Every other declared capability gets the next fresh slot, in
//!    declaration order.
//!
//! Names within one declaration must be distinct:
//!
//! ```compile_fail
//! use polyface::{Capability, markers::ByRef};
//!
//! struct Spin;
//! struct SpinFast;
//!
//! impl Capability for Spin {
//!     const NAME: &'static str = "spin";
//!     type Receiver = ByRef;
//!     type Args<'a> = ();
//!     type Output = ();
//! }
//!
//! impl Capability for SpinFast {
//!     const NAME: &'static str = "spin";
//!     type Receiver = ByRef;
//!     type Args<'a> = ();
//!     type Output = ();
//! }
//!
//! polyface::interface! { struct Spinner { Spin, SpinFast } }
//!
//! const SLOT: usize = polyface::slot_index::<Spinner, Spin>();
//! ```
//!
//! The layout is computed during constant evaluation by [`Chain`], which is
//! what lets [`Poly::call`](crate::Poly::call) reject capabilities that an
//! interface does not declare at compile time. The
//! [`registry`](crate::registry) keeps a runtime view of the same layout.

use polyface_internals::StorageKind;

use crate::{
    capability::{Capability, CapabilityList, SatisfiedBy},
    registry,
    table::DispatchTable,
};

/// A set of capabilities that erased values can be called through.
///
/// Most interfaces are declared with the [`interface!`](crate::interface!)
/// macro. Implementing the trait by hand is only needed for generic
/// interfaces:
///
/// ```
/// use core::marker::PhantomData;
///
/// use polyface::{Capability, Implementation, Interface, Poly, markers::ByRef};
///
/// struct Apply<A, R>(PhantomData<fn(A) -> R>);
///
/// impl<A: 'static, R: 'static> Capability for Apply<A, R> {
///     const NAME: &'static str = "apply";
///     type Receiver = ByRef;
///     type Args<'a> = A;
///     type Output = R;
/// }
///
/// impl<F, A, R> Implementation<F> for Apply<A, R>
/// where
///     F: Fn(A) -> R + 'static,
///     A: 'static,
///     R: 'static,
/// {
///     fn invoke<'a>(target: &'a F, args: A) -> R {
///         target(args)
///     }
/// }
///
/// struct Function<A, R>(PhantomData<fn(A) -> R>);
///
/// impl<A: 'static, R: 'static> Interface for Function<A, R> {
///     const NAME: &'static str = "Function";
///     type Base = ();
///     type Capabilities = (Apply<A, R>,);
/// }
///
/// let double: Poly<Function<i32, i32>> = Poly::new_move_only(|x: i32| x * 2);
/// assert_eq!(double.call::<Apply<i32, i32>>(21), 42);
/// ```
pub trait Interface: 'static {
    /// The name of the interface.
    const NAME: &'static str;

    /// The interface this one extends, or `()`.
    type Base: Lineage;

    /// The capabilities declared by this interface, in declaration order.
    type Capabilities: CapabilityList;
}

/// Either `()` or an [`Interface`]: the possible bases of an interface.
pub trait Lineage: 'static {
    /// The layout chain of the interface, or `None` for `()`.
    const CHAIN: Option<&'static Chain>;
}

impl Lineage for () {
    const CHAIN: Option<&'static Chain> = None;
}

impl<I: Interface> Lineage for I {
    const CHAIN: Option<&'static Chain> = Some(Chain::of::<I>());
}

/// The compile-time description of an interface and all of its bases.
#[derive(Copy, Clone, Debug)]
pub struct Chain {
    /// [`Interface::NAME`] of the interface.
    interface: &'static str,
    /// [`CapabilityList::NAMES`] of the interface.
    local: &'static [&'static str],
    /// The chain of the base interface.
    base: Option<&'static Chain>,
}

impl Chain {
    /// Returns the chain of the interface `I`.
    ///
    /// # Panics
    ///
    /// Panics during constant evaluation if `I` declares two capabilities
    /// with the same name.
    pub const fn of<I: Interface>() -> &'static Chain {
        const {
            assert!(
                all_distinct(<I::Capabilities as CapabilityList>::NAMES),
                "an interface cannot declare two capabilities with the same name"
            );
            &Chain {
                interface: I::NAME,
                local: <I::Capabilities as CapabilityList>::NAMES,
                base: <I::Base as Lineage>::CHAIN,
            }
        }
    }

    /// Returns the name of the interface.
    #[inline]
    pub const fn interface_name(&self) -> &'static str {
        self.interface
    }

    /// Returns the capability names declared by the interface itself.
    #[inline]
    pub const fn local_names(&self) -> &'static [&'static str] {
        self.local
    }

    /// Returns the chain of the base interface.
    #[inline]
    pub const fn base(&self) -> Option<&'static Chain> {
        self.base
    }

    /// Returns the number of slots of the interface, including inherited
    /// ones.
    pub const fn len(&self) -> usize {
        let mut len = match self.base {
            Some(base) => base.len(),
            None => 0,
        };
        let mut i = 0;
        while i < self.local.len() {
            if self.is_fresh(i) {
                len += 1;
            }
            i += 1;
        }
        len
    }

    /// Returns `true` if the interface has no slots.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the slot of the capability called `name`.
    pub const fn index_of(&self, name: &str) -> Option<usize> {
        let mut next = match self.base {
            Some(base) => {
                if let Some(index) = base.index_of(name) {
                    return Some(index);
                }
                base.len()
            }
            None => 0,
        };
        let mut i = 0;
        while i < self.local.len() {
            if self.is_fresh(i) {
                if str_eq(self.local[i], name) {
                    return Some(next);
                }
                next += 1;
            }
            i += 1;
        }
        None
    }

    /// Returns `true` if the `i`th local name is not laid out by the base.
    const fn is_fresh(&self, i: usize) -> bool {
        match self.base {
            Some(base) => base.index_of(self.local[i]).is_none(),
            None => true,
        }
    }
}

/// Returns `true` if no name occurs twice in `names`.
const fn all_distinct(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        let mut j = 0;
        while j < i {
            if str_eq(names[i], names[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

/// String equality usable during constant evaluation.
const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Returns the slot of capability `C` in interface `I`.
///
/// Evaluated in a `const` block, this turns calls of undeclared capabilities
/// into compile errors:
///
/// ```compile_fail
/// polyface::interface! { struct Empty {} }
///
/// struct Draw;
///
/// impl polyface::Capability for Draw {
///     const NAME: &'static str = "draw";
///     type Receiver = polyface::markers::ByRef;
///     type Args<'a> = ();
///     type Output = ();
/// }
///
/// const SLOT: usize = polyface::slot_index::<Empty, Draw>();
/// ```
///
/// # Panics
///
/// Panics if neither `I` nor any of its bases declares a capability named
/// [`C::NAME`](Capability::NAME), or if `I` declares two capabilities with
/// the same name.
pub const fn slot_index<I: Interface, C: Capability>() -> usize {
    match Chain::of::<I>().index_of(C::NAME) {
        Some(index) => index,
        None => panic!("the capability is not declared by the interface or any of its bases"),
    }
}

/// Structural compatibility: `T` provides every capability of `I` and of all
/// of `I`'s bases.
///
/// The trait is implemented automatically, and it is the bound that gates
/// the construction of erased values. It can gate generic code the same way:
///
/// ```
/// use polyface::{Capability, Implementation, Satisfies, Var, markers::ByRef};
///
/// struct Draw;
///
/// impl Capability for Draw {
///     const NAME: &'static str = "draw";
///     type Receiver = ByRef;
///     type Args<'a> = &'a mut String;
///     type Output = ();
/// }
///
/// struct Square;
///
/// impl Implementation<Square> for Draw {
///     fn invoke<'a>(_: &'a Square, out: &'a mut String) {
///         out.push_str("Square");
///     }
/// }
///
/// polyface::interface! { struct Drawable { Draw } }
///
/// fn draw<T: Satisfies<Drawable>>(shape: T) -> String
/// where
///     Draw: Implementation<T>,
/// {
///     let mut out = String::new();
///     Var::<Drawable, T>::new(shape).call::<Draw>(&mut out);
///     out
/// }
///
/// assert_eq!(draw(Square), "Square");
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not satisfy the interface `{I}`",
    label = "`{Self}` is missing at least one capability of `{I}`",
    note = "every capability of `{I}` and of its bases needs an implementation for `{Self}`"
)]
pub trait Satisfies<I: Interface>: 'static {
    /// Returns the dispatch table of `I` for `Self`, building it on first
    /// use.
    fn dispatch_table(storage: StorageKind) -> &'static DispatchTable;
}

impl<T, I> Satisfies<I> for T
where
    T: 'static,
    I: Interface,
    I::Capabilities: SatisfiedBy<T>,
    I::Base: Ancestry<T>,
{
    fn dispatch_table(storage: StorageKind) -> &'static DispatchTable {
        let base = <I::Base as Ancestry<T>>::dispatch_table(storage);
        registry::dispatch_table::<I, T>(storage, base)
    }
}

/// Structural compatibility of `T` with an interface's base, if any.
pub trait Ancestry<T: 'static>: Lineage {
    /// Returns the dispatch table of the base for `T`, or `None` for `()`.
    fn dispatch_table(storage: StorageKind) -> Option<&'static DispatchTable>;
}

impl<T: 'static> Ancestry<T> for () {
    #[inline]
    fn dispatch_table(_storage: StorageKind) -> Option<&'static DispatchTable> {
        None
    }
}

impl<T, I> Ancestry<T> for I
where
    T: Satisfies<I>,
    I: Interface,
{
    #[inline]
    fn dispatch_table(storage: StorageKind) -> Option<&'static DispatchTable> {
        Some(<T as Satisfies<I>>::dispatch_table(storage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::ByRef;

    macro_rules! capabilities {
        ($($name:ident = $tag:literal),* $(,)?) => {
            $(
                struct $name;

                impl Capability for $name {
                    const NAME: &'static str = $tag;
                    type Receiver = ByRef;
                    type Args<'a> = ();
                    type Output = ();
                }
            )*
        };
    }

    capabilities!(Draw = "draw", DrawAgain = "draw", Resize = "resize", Rotate = "rotate");

    struct V1;

    impl Interface for V1 {
        const NAME: &'static str = "V1";
        type Base = ();
        type Capabilities = (Draw, Resize);
    }

    struct V2;

    impl Interface for V2 {
        const NAME: &'static str = "V2";
        type Base = V1;
        type Capabilities = ();
    }

    struct V3;

    impl Interface for V3 {
        const NAME: &'static str = "V3";
        type Base = V2;
        type Capabilities = (Rotate, DrawAgain);
    }

    #[test]
    fn test_chain_layout() {
        assert_eq!(Chain::of::<V1>().len(), 2);
        assert_eq!(Chain::of::<V2>().len(), 2);
        assert_eq!(Chain::of::<V3>().len(), 3);
        assert!(!Chain::of::<V1>().is_empty());

        assert_eq!(Chain::of::<V1>().index_of("draw"), Some(0));
        assert_eq!(Chain::of::<V1>().index_of("resize"), Some(1));
        assert_eq!(Chain::of::<V1>().index_of("rotate"), None);
        assert_eq!(Chain::of::<V3>().index_of("rotate"), Some(2));
        assert_eq!(Chain::of::<V3>().index_of("draw"), Some(0));
    }

    #[test]
    fn test_repeated_names_are_detected() {
        assert!(all_distinct(&[]));
        assert!(all_distinct(&["draw", "resize", "rotate"]));
        assert!(!all_distinct(&["rotate", "draw", "rotate"]));
        assert!(!all_distinct(&["draw", "draw"]));
        assert!(all_distinct(<(Draw, Resize) as CapabilityList>::NAMES));
        assert!(!all_distinct(<(Draw, DrawAgain) as CapabilityList>::NAMES));
    }

    #[test]
    fn test_slot_index_is_const() {
        const DRAW: usize = slot_index::<V3, DrawAgain>();
        const ROTATE: usize = slot_index::<V3, Rotate>();
        const RESIZE: usize = slot_index::<V3, Resize>();
        assert_eq!((DRAW, RESIZE, ROTATE), (0, 1, 2));
    }

    #[test]
    fn test_chain_bases() {
        let base = Chain::of::<V3>().base().and_then(Chain::base);
        assert_eq!(base.map(Chain::interface_name), Some("V1"));
        assert_eq!(Chain::of::<V3>().local_names(), &["rotate", "draw"]);
    }

    #[test]
    fn test_str_eq() {
        assert!(str_eq("draw", "draw"));
        assert!(!str_eq("draw", "drew"));
        assert!(!str_eq("draw", "drawn"));
        assert!(str_eq("", ""));
    }
}
