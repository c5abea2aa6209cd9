//! Statically dispatched values checked against an interface.
//!
//! A [`Var<I, T>`] keeps its concrete type. It exists to state, in a type,
//! that `T` satisfies `I`, and to restrict calls to the capabilities `I`
//! declares. Calls compile down to direct calls of the implementations. A
//! `Var` can be erased into a [`Poly`] at any time.

use core::marker::PhantomData;

use polyface_internals::{Storage, Strategy};

use crate::{
    capability::{Implementation, ImplementationMut},
    interface::{Interface, Satisfies, slot_index},
    poly::Poly,
};

/// A `T` used through the interface `I`.
pub struct Var<I: Interface, T: Satisfies<I>> {
    value: T,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface, T: Satisfies<I>> Var<I, T> {
    /// Wraps `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            value,
            _interface: PhantomData,
        }
    }

    /// Returns the value.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Returns the value mutably.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    /// Unwraps the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Invokes the capability `C`, which `I` must declare.
    #[inline]
    pub fn call<'a, C>(&'a self, args: C::Args<'a>) -> C::Output
    where
        C: Implementation<T>,
    {
        let _ = const { slot_index::<I, C>() };
        C::invoke(&self.value, args)
    }

    /// Invokes the mutating capability `C`, which `I` must declare.
    #[inline]
    pub fn call_mut<'a, C>(&'a mut self, args: C::Args<'a>) -> C::Output
    where
        C: ImplementationMut<T>,
    {
        let _ = const { slot_index::<I, C>() };
        C::invoke_mut(&mut self.value, args)
    }

    /// Erases the value with the storage `S`.
    #[inline]
    pub fn erase<S>(self) -> Poly<I, S>
    where
        S: Storage + Strategy<T, Target = T>,
        T: Clone,
    {
        Poly::new(self.value)
    }

    /// Erases the value with the storage `S`, without requiring it to be
    /// [`Clone`].
    #[inline]
    pub fn erase_move_only<S>(self) -> Poly<I, S>
    where
        S: Storage + Strategy<T, Target = T>,
    {
        Poly::new_move_only(self.value)
    }
}

impl<I: Interface, T: Satisfies<I> + Clone> Clone for Var<I, T> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<I: Interface, T: Satisfies<I> + core::fmt::Debug> core::fmt::Debug for Var<I, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Var")
            .field("interface", &I::NAME)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use polyface_internals::{Heap, Inline};

    use super::*;
    use crate::{Capability, markers::{ByMut, ByRef}};

    struct Get;

    impl Capability for Get {
        const NAME: &'static str = "get";
        type Receiver = ByRef;
        type Args<'a> = ();
        type Output = i64;
    }

    struct Add;

    impl Capability for Add {
        const NAME: &'static str = "add";
        type Receiver = ByMut;
        type Args<'a> = i64;
        type Output = ();
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Total(i64);

    impl Implementation<Total> for Get {
        fn invoke<'a>(target: &'a Total, (): ()) -> i64 {
            target.0
        }
    }

    impl ImplementationMut<Total> for Add {
        fn invoke_mut<'a>(target: &'a mut Total, by: i64) {
            target.0 += by;
        }
    }

    crate::interface! { struct Accumulator { Get, Add } }

    #[test]
    fn test_static_calls() {
        let mut total = Var::<Accumulator, _>::new(Total(1));
        total.call_mut::<Add>(41);
        assert_eq!(total.call::<Get>(()), 42);
        assert_eq!(total.get(), &Total(42));
        total.get_mut().0 = 0;
        assert_eq!(total.clone().into_inner(), Total(0));
    }

    #[test]
    fn test_erase() {
        let mut heap = Var::<Accumulator, _>::new(Total(2)).erase::<Heap>();
        heap.call_mut::<Add>(3);
        assert_eq!(heap.call::<Get>(()), 5);

        let inline = Var::<Accumulator, _>::new(Total(7)).erase_move_only::<Inline<8>>();
        assert_eq!(inline.call::<Get>(()), 7);
        assert!(inline.try_clone().is_err());
    }
}
