//! The erased value.
//!
//! A [`Poly<I, S>`] owns (or views) a target of some type that satisfies the
//! interface `I`, stored with the strategy `S`. Which type the target has is
//! only known at runtime: every call goes through the shared dispatch table
//! that was looked up when the value was built.
//!
//! The storage decides what copying means:
//!
//! | Storage | Copying |
//! |---|---|
//! | [`Heap`], [`Inline`], [`Sbo`] | Deep-copies the target, fails for move-only targets |
//! | [`Shared`] | Bumps the reference count |
//! | [`Borrowed`] | Views the same target again |
//! | [`BorrowedMut`] | Always fails |
//!
//! [`Inline`]: polyface_internals::Inline
//! [`Sbo`]: polyface_internals::Sbo
//! [`Shared`]: polyface_internals::Shared

use core::{any::TypeId, marker::PhantomData};

use polyface_internals::{
    Borrowed, BorrowedMut, Heap, MutableStorage, RawHandle, Storage, StorageKind, Strategy,
};
use rootcause::Report;

use crate::{
    capability::{Capability, ExclusiveThunk, SharedThunk},
    error::IllegalCopy,
    interface::{Interface, Satisfies, slot_index},
    markers::{ByMut, ByRef, CopyPolicy, Copyable, MoveOnly},
    table::DispatchTable,
};

/// A value of any type satisfying the interface `I`, stored with the
/// strategy `S`.
///
/// # Examples
///
/// ```
/// use polyface::{Capability, Implementation, Inline, Poly, Shared, markers::ByRef};
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
/// #[derive(Clone)]
/// struct Square;
///
/// #[derive(Clone)]
/// struct Circle;
///
/// impl Implementation<Square> for Draw {
///     fn invoke<'a>(_: &'a Square, out: &'a mut String) {
///         out.push_str("Square");
///     }
/// }
///
/// impl Implementation<Circle> for Draw {
///     fn invoke<'a>(_: &'a Circle, out: &'a mut String) {
///         out.push_str("Circle");
///     }
/// }
///
/// polyface::interface! { struct Drawable { Draw } }
///
/// let mut out = String::new();
///
/// let mut shape: Poly<Drawable> = Poly::new(Square);
/// shape.call::<Draw>(&mut out);
/// shape.assign(Circle);
/// shape.call::<Draw>(&mut out);
///
/// let inline: Poly<Drawable, Inline<16>> = Poly::new(Square);
/// let shared: Poly<Drawable, Shared> = Poly::new(Circle);
/// inline.call::<Draw>(&mut out);
/// shared.clone().call::<Draw>(&mut out);
///
/// assert_eq!(out, "SquareCircleSquareCircle");
/// ```
pub struct Poly<I: Interface, S: Storage = Heap> {
    /// The target, together with the operations to release and copy it
    handle: RawHandle<S>,
    /// The table of `I` for the target's type, built for `S::KIND`
    table: &'static DispatchTable,
    _interface: PhantomData<fn() -> I>,
}

impl<I: Interface, S: Storage> Poly<I, S> {
    /// Erases `value`. Copies of the erased value deep-copy the target
    /// through [`Clone`] where the storage needs it.
    ///
    /// A type that lacks a capability of `I` cannot be erased:
    ///
    /// ```compile_fail,E0277
    /// use polyface::{Capability, Implementation, Poly, markers::ByRef};
    ///
    /// struct Draw;
    ///
    /// impl Capability for Draw {
    ///     const NAME: &'static str = "draw";
    ///     type Receiver = ByRef;
    ///     type Args<'a> = ();
    ///     type Output = ();
    /// }
    ///
    /// #[derive(Clone)]
    /// struct Square;
    ///
    /// #[derive(Clone)]
    /// struct Text;
    ///
    /// impl Implementation<Square> for Draw {
    ///     fn invoke<'a>(_: &'a Square, (): ()) {}
    /// }
    ///
    /// polyface::interface! { struct Drawable { Draw } }
    ///
    /// // `Text` has no `Draw` implementation.
    /// let text: Poly<Drawable> = Poly::new(Text);
    /// ```
    #[inline]
    pub fn new<V>(value: V) -> Self
    where
        S: Strategy<V>,
        <S as Strategy<V>>::Target: Satisfies<I> + Clone,
    {
        Self::with_policy::<V, Copyable>(value)
    }

    /// Erases `value` without requiring the target to be [`Clone`].
    ///
    /// Copying the erased value fails with [`IllegalCopy`] under storages
    /// that deep-copy.
    #[inline]
    pub fn new_move_only<V>(value: V) -> Self
    where
        S: Strategy<V>,
        <S as Strategy<V>>::Target: Satisfies<I>,
    {
        Self::with_policy::<V, MoveOnly>(value)
    }

    fn with_policy<V, P>(value: V) -> Self
    where
        S: Strategy<V>,
        P: CopyPolicy<<S as Strategy<V>>::Target>,
        <S as Strategy<V>>::Target: Satisfies<I>,
    {
        let table = <<S as Strategy<V>>::Target as Satisfies<I>>::dispatch_table(S::KIND);
        let handle = RawHandle::new::<V, P>(value);
        tracing::trace!(
            interface = I::NAME,
            target = handle.target_type_name(),
            storage = %S::KIND,
            "erased value"
        );
        Self {
            handle,
            table,
            _interface: PhantomData,
        }
    }

    /// Replaces the target with `value`, which may be of another type.
    ///
    /// The new target is stored before the old one is released.
    #[inline]
    pub fn assign<V>(&mut self, value: V)
    where
        S: Strategy<V>,
        <S as Strategy<V>>::Target: Satisfies<I> + Clone,
    {
        *self = Self::new(value);
    }

    /// Replaces the target with the move-only `value`.
    #[inline]
    pub fn assign_move_only<V>(&mut self, value: V)
    where
        S: Strategy<V>,
        <S as Strategy<V>>::Target: Satisfies<I>,
    {
        *self = Self::new_move_only(value);
    }

    /// Copies the erased value.
    ///
    /// # Errors
    ///
    /// Fails with [`IllegalCopy`] when the storage deep-copies and the target
    /// was stored as move-only, or when the storage is [`BorrowedMut`].
    pub fn try_clone(&self) -> Result<Self, Report<IllegalCopy>> {
        match self.handle.try_duplicate() {
            Some(handle) => {
                tracing::trace!(
                    interface = I::NAME,
                    target = handle.target_type_name(),
                    storage = %S::KIND,
                    "copied erased value"
                );
                Ok(Self {
                    handle,
                    table: self.table,
                    _interface: PhantomData,
                })
            }
            None => {
                let error = IllegalCopy::new(I::NAME, self.target_type_name(), S::KIND);
                tracing::debug!(%error, "refused to copy erased value");
                Err(Report::new(error))
            }
        }
    }

    /// Replaces `self` with a copy of `source`.
    ///
    /// # Errors
    ///
    /// Fails like [`Poly::try_clone`], in which case `self` is left
    /// untouched.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<(), Report<IllegalCopy>> {
        *self = source.try_clone()?;
        Ok(())
    }

    /// Invokes the capability `C` on the target.
    ///
    /// Calling a capability that `I` does not declare fails to compile.
    /// Calling a base interface's capability that `I` overrides invokes the
    /// base's implementation, as on the value returned by [`Poly::upcast`].
    ///
    /// # Panics
    ///
    /// Panics if `C` is not declared anywhere in the chain of `I`, but shares
    /// its [`C::NAME`](Capability::NAME) with a capability that is.
    #[inline]
    #[track_caller]
    pub fn call<'a, C>(&'a self, args: C::Args<'a>) -> C::Output
    where
        C: Capability<Receiver = ByRef>,
    {
        let index = const { slot_index::<I, C>() };
        let thunk = self.table.thunk::<C, SharedThunk<C>>(index);
        // SAFETY:
        // 1. The table was built for the type of the target behind `handle`,
        //    so every thunk in it casts to that type.
        unsafe { thunk(self.handle.as_ref(), args) }
    }

    /// Invokes the capability `C` on the target, letting it mutate the
    /// target.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Poly::call`].
    #[inline]
    #[track_caller]
    pub fn call_mut<'a, C>(&'a mut self, args: C::Args<'a>) -> C::Output
    where
        C: Capability<Receiver = ByMut>,
        S: MutableStorage,
    {
        let index = const { slot_index::<I, C>() };
        let thunk = self.table.thunk::<C, ExclusiveThunk<C>>(index);
        // SAFETY:
        // 1. The table was built for the type of the target behind `handle`,
        //    so every thunk in it casts to that type.
        unsafe { thunk(self.handle.as_mut(), args) }
    }

    /// Invokes the capability `C` and converts its output to `R`.
    ///
    /// ```
    /// use polyface::{Capability, Implementation, Poly, markers::ByRef};
    ///
    /// struct Area;
    ///
    /// impl Capability for Area {
    ///     const NAME: &'static str = "area";
    ///     type Receiver = ByRef;
    ///     type Args<'a> = ();
    ///     type Output = f32;
    /// }
    ///
    /// struct Unit;
    ///
    /// impl Implementation<Unit> for Area {
    ///     fn invoke<'a>(_: &'a Unit, (): ()) -> f32 {
    ///         1.5
    ///     }
    /// }
    ///
    /// polyface::interface! { struct Measured { Area } }
    ///
    /// let unit: Poly<Measured> = Poly::new_move_only(Unit);
    /// let area: f64 = unit.call_as::<Area, f64>(());
    /// assert_eq!(area, 1.5);
    /// ```
    ///
    /// An output that does not convert into `R` fails to compile:
    ///
    /// ```compile_fail,E0277
    /// use polyface::{Capability, Implementation, Poly, markers::ByRef};
    ///
    /// struct Area;
    ///
    /// impl Capability for Area {
    ///     const NAME: &'static str = "area";
    ///     type Receiver = ByRef;
    ///     type Args<'a> = ();
    ///     type Output = f32;
    /// }
    ///
    /// struct Unit;
    ///
    /// impl Implementation<Unit> for Area {
    ///     fn invoke<'a>(_: &'a Unit, (): ()) -> f32 {
    ///         1.5
    ///     }
    /// }
    ///
    /// polyface::interface! { struct Measured { Area } }
    ///
    /// let unit: Poly<Measured> = Poly::new_move_only(Unit);
    /// let area: u8 = unit.call_as::<Area, u8>(());
    /// ```
    #[inline]
    #[track_caller]
    pub fn call_as<'a, C, R>(&'a self, args: C::Args<'a>) -> R
    where
        C: Capability<Receiver = ByRef>,
        C::Output: Into<R>,
    {
        self.call::<C>(args).into()
    }

    /// Converts the value into an erased value of the base interface.
    ///
    /// The result dispatches through the base table, so capabilities that
    /// `I` overrides behave as the base declares them.
    pub fn upcast(self) -> Poly<I::Base, S>
    where
        I::Base: Interface,
    {
        let Some(table) = self.table.base() else {
            unreachable!(
                "dispatch table of `{}` has no base table although it extends `{}`",
                I::NAME,
                <I::Base as Interface>::NAME
            )
        };

        Poly {
            handle: self.handle,
            table,
            _interface: PhantomData,
        }
    }

    /// Returns the [`core::any::type_name`] of the target.
    #[inline]
    pub fn target_type_name(&self) -> &'static str {
        self.handle.target_type_name()
    }

    /// Returns the [`TypeId`] of the target.
    #[inline]
    pub fn target_type_id(&self) -> TypeId {
        self.handle.target_type_id()
    }

    /// Returns `true` if the target is a `T`.
    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.target_type_id() == TypeId::of::<T>()
    }

    /// Returns the target if it is a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }

        // SAFETY:
        // 1. We just checked that the target is a `T`.
        let target = unsafe { self.handle.as_ref().downcast_unchecked::<T>() };
        Some(target)
    }

    /// Returns the target mutably if it is a `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T>
    where
        S: MutableStorage,
    {
        if !self.is::<T>() {
            return None;
        }

        // SAFETY:
        // 1. We just checked that the target is a `T`.
        let target = unsafe { self.handle.as_mut().downcast_unchecked::<T>() };
        Some(target)
    }

    /// Returns the kind of storage the target is kept in.
    #[inline]
    pub fn storage_kind(&self) -> StorageKind {
        S::KIND
    }

    /// Returns the storage the target is kept in.
    #[inline]
    pub fn storage(&self) -> &S {
        self.handle.storage()
    }

    /// Returns the number of erased values sharing the target, for
    /// [`Shared`](polyface_internals::Shared) storage.
    #[inline]
    pub fn share_count(&self) -> Option<usize> {
        self.handle.share_count()
    }

    /// Returns the dispatch table the value calls through.
    #[inline]
    pub fn dispatch_table(&self) -> &'static DispatchTable {
        self.table
    }

    /// Returns the name of the interface.
    #[inline]
    pub fn interface_name(&self) -> &'static str {
        I::NAME
    }
}

impl<'a, I: Interface> Poly<I, Borrowed<'a>> {
    /// Views `target` without taking ownership of it.
    ///
    /// Copies of the erased value view the same target.
    #[inline]
    pub fn from_ref<T: Satisfies<I>>(target: &'a T) -> Self {
        Self::new_move_only(target)
    }
}

impl<'a, I: Interface> Poly<I, BorrowedMut<'a>> {
    /// Views `target` exclusively without taking ownership of it. Mutating
    /// capabilities called through the erased value mutate `target` itself.
    #[inline]
    pub fn from_mut<T: Satisfies<I>>(target: &'a mut T) -> Self {
        Self::new_move_only(target)
    }
}

impl<I: Interface, S: Storage> Clone for Poly<I, S> {
    /// Copies the erased value.
    ///
    /// # Panics
    ///
    /// Panics when [`Poly::try_clone`] fails.
    #[track_caller]
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(report) => panic!("{report}"),
        }
    }
}

impl<I: Interface, S: Storage> core::fmt::Debug for Poly<I, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Poly")
            .field("interface", &I::NAME)
            .field("target", &self.target_type_name())
            .field("storage", &S::KIND)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, string::String, vec::Vec};
    use core::cell::Cell;

    use polyface_internals::{Inline, Sbo, Shared};

    use super::*;
    use crate::{Implementation, ImplementationMut};

    struct Name;

    impl Capability for Name {
        const NAME: &'static str = "name";
        type Receiver = ByRef;
        type Args<'a> = &'a mut String;
        type Output = ();
    }

    struct Bump;

    impl Capability for Bump {
        const NAME: &'static str = "bump";
        type Receiver = ByMut;
        type Args<'a> = ();
        type Output = u32;
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Counter(u32);

    struct Token(Rc<Cell<u32>>);

    impl Drop for Token {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl Implementation<Counter> for Name {
        fn invoke<'a>(_: &'a Counter, out: &'a mut String) {
            out.push_str("Counter");
        }
    }

    impl Implementation<Token> for Name {
        fn invoke<'a>(_: &'a Token, out: &'a mut String) {
            out.push_str("Token");
        }
    }

    impl ImplementationMut<Counter> for Bump {
        fn invoke_mut<'a>(target: &'a mut Counter, (): ()) -> u32 {
            target.0 += 1;
            target.0
        }
    }

    crate::interface! { struct Named { Name } }
    crate::interface! { struct Bumpable: Named { Bump } }

    fn name<I: Interface, S: Storage>(value: &Poly<I, S>) -> String {
        let mut out = String::new();
        value.call::<Name>(&mut out);
        out
    }

    #[test]
    fn test_dispatch_through_every_storage() {
        let heap: Poly<Named> = Poly::new(Counter(0));
        let inline: Poly<Named, Inline<8>> = Poly::new(Counter(0));
        let sbo: Poly<Named, Sbo<8>> = Poly::new(Counter(0));
        let shared: Poly<Named, Shared> = Poly::new(Counter(0));
        let counter = Counter(0);
        let borrowed: Poly<Named, Borrowed<'_>> = Poly::from_ref(&counter);

        assert_eq!(name(&heap), "Counter");
        assert_eq!(name(&inline), "Counter");
        assert_eq!(name(&sbo), "Counter");
        assert_eq!(name(&shared), "Counter");
        assert_eq!(name(&borrowed), "Counter");
        assert!(sbo.storage().is_inline());
    }

    #[test]
    fn test_call_mut_and_upcast() {
        let mut value: Poly<Bumpable> = Poly::new(Counter(0));
        assert_eq!(value.call_mut::<Bump>(()), 1);
        assert_eq!(value.call_mut::<Bump>(()), 2);

        let base = value.upcast();
        assert_eq!(base.interface_name(), "Named");
        assert_eq!(base.downcast_ref::<Counter>(), Some(&Counter(2)));
        assert_eq!(name(&base), "Counter");
    }

    #[test]
    fn test_copy_of_move_only_target() {
        let drops = Rc::new(Cell::new(0));
        let heap: Poly<Named> = Poly::new_move_only(Token(drops.clone()));
        let report = heap.try_clone().unwrap_err();
        assert_eq!(report.current_context().storage_kind(), StorageKind::Heap);
        assert_eq!(name(&heap), "Token");

        let shared: Poly<Named, Shared> = Poly::new_move_only(Token(drops.clone()));
        let copy = shared.try_clone().unwrap();
        assert_eq!(shared.share_count(), Some(2));
        drop(copy);
        assert_eq!(shared.share_count(), Some(1));

        drop((heap, shared));
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn test_try_clone_from_keeps_target_on_failure() {
        let mut target: Poly<Named> = Poly::new(Counter(7));
        let source: Poly<Named> = Poly::new_move_only(Token(Rc::new(Cell::new(0))));
        assert!(target.try_clone_from(&source).is_err());
        assert_eq!(target.downcast_ref::<Counter>(), Some(&Counter(7)));

        let copyable: Poly<Named> = Poly::new(Counter(9));
        target.try_clone_from(&copyable).unwrap();
        assert_eq!(target.downcast_ref::<Counter>(), Some(&Counter(9)));
    }

    #[test]
    fn test_borrowed_mut_refuses_copies() {
        let mut counter = Counter(0);
        let mut value: Poly<Bumpable, BorrowedMut<'_>> = Poly::from_mut(&mut counter);
        value.call_mut::<Bump>(());
        assert!(value.try_clone().is_err());
        drop(value);
        assert_eq!(counter, Counter(1));
    }

    #[test]
    fn test_downcast() {
        let mut value: Poly<Bumpable> = Poly::new(Counter(3));
        assert!(value.is::<Counter>());
        assert!(!value.is::<Token>());
        assert!(value.downcast_ref::<Token>().is_none());
        if let Some(counter) = value.downcast_mut::<Counter>() {
            counter.0 = 10;
        }
        assert_eq!(value.call_mut::<Bump>(()), 11);
    }

    #[test]
    fn test_tables_are_shared() {
        let values: Vec<Poly<Named>> = (0..3).map(|n| Poly::new(Counter(n))).collect();
        assert!(core::ptr::eq(
            values[0].dispatch_table(),
            values[2].dispatch_table()
        ));
        assert_eq!(values[1].dispatch_table().storage_kind(), StorageKind::Heap);
    }

    #[test]
    fn test_not_send_or_sync() {
        static_assertions::assert_not_impl_any!(Poly<Named>: Send, Sync);
        static_assertions::assert_not_impl_any!(Poly<Named, Shared>: Send, Sync);
        static_assertions::assert_impl_all!(Poly<Named>: Clone, core::fmt::Debug);
    }
}
