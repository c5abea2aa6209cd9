//! Dispatch tables.
//!
//! A [`DispatchTable`] holds one [`Thunk`] per slot of an interface's
//! [`Layout`], instantiated for one concrete target type. Tables are built
//! once per (interface, target type, storage kind), leaked, and shared by
//! every erased value of that combination. See [`registry`](crate::registry).

use alloc::{boxed::Box, vec::Vec};
use core::any::{Any, TypeId};

use polyface_internals::StorageKind;

use crate::{
    capability::{Capability, SatisfiedBy},
    interface::Interface,
    registry::Layout,
};

/// One dispatch-table entry: a type-erased thunk for a single capability.
#[derive(Clone, Copy)]
pub struct Thunk {
    /// The [`TypeId`] of the capability the thunk invokes.
    capability: TypeId,
    /// The [`core::any::type_name`] of the capability.
    capability_type_name: &'static str,
    /// The [`Capability::NAME`] of the capability.
    name: &'static str,
    /// The thunk itself, a `&'static SharedThunk<C>` or
    /// `&'static ExclusiveThunk<C>`.
    erased: &'static (dyn Any + Send + Sync),
}

impl Thunk {
    /// Erases the thunk `F` of capability `C`.
    #[inline]
    pub(crate) fn new<C: Capability, F: Any + Send + Sync>(erased: &'static F) -> Self {
        Self {
            capability: TypeId::of::<C>(),
            capability_type_name: core::any::type_name::<C>(),
            name: C::NAME,
            erased,
        }
    }

    /// Returns the name of the capability.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the capability.
    #[inline]
    pub fn capability_type_id(&self) -> TypeId {
        self.capability
    }

    /// Returns the [`core::any::type_name`] of the capability.
    #[inline]
    pub fn capability_type_name(&self) -> &'static str {
        self.capability_type_name
    }

    /// Returns `true` if both entries hold the very same thunk.
    #[inline]
    pub fn same_entry(&self, other: &Thunk) -> bool {
        core::ptr::addr_eq(self.erased, other.erased)
    }
}

impl core::fmt::Debug for Thunk {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Thunk")
            .field("name", &self.name)
            .field("capability", &self.capability_type_name)
            .finish()
    }
}

/// The thunks of one interface, instantiated for one target type.
pub struct DispatchTable {
    /// [`Interface::NAME`] of the interface.
    interface: &'static str,
    /// [`core::any::type_name`] of the target.
    target: &'static str,
    /// The storage kind the table was built for.
    storage: StorageKind,
    /// One thunk per slot, in slot order.
    slots: Box<[Thunk]>,
    /// The table of the base interface, for the same target and storage.
    base: Option<&'static DispatchTable>,
}

impl DispatchTable {
    /// Builds the table of interface `I` for targets of type `T`.
    pub(crate) fn build<I, T>(
        layout: &Layout,
        storage: StorageKind,
        base: Option<&'static DispatchTable>,
    ) -> Self
    where
        I: Interface,
        T: 'static,
        I::Capabilities: SatisfiedBy<T>,
    {
        let mut builder = TableBuilder::new(layout, base);
        <I::Capabilities as SatisfiedBy<T>>::install(&mut builder);
        debug_assert_eq!(builder.slots.len(), layout.len());

        Self {
            interface: I::NAME,
            target: core::any::type_name::<T>(),
            storage,
            slots: builder.slots.into_boxed_slice(),
            base,
        }
    }

    /// Returns the name of the interface the table was built for.
    #[inline]
    pub fn interface_name(&self) -> &'static str {
        self.interface
    }

    /// Returns the type name of the target the table was built for.
    #[inline]
    pub fn target_type_name(&self) -> &'static str {
        self.target
    }

    /// Returns the storage kind the table was built for.
    #[inline]
    pub fn storage_kind(&self) -> StorageKind {
        self.storage
    }

    /// Returns the number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the table has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the entries, in slot order.
    #[inline]
    pub fn slots(&self) -> &[Thunk] {
        &self.slots
    }

    /// Returns the capability names, in slot order.
    pub fn slot_names(&self) -> impl ExactSizeIterator<Item = &'static str> + '_ {
        self.slots.iter().map(Thunk::name)
    }

    /// Returns the table of the base interface, if the interface extends
    /// one.
    #[inline]
    pub fn base(&self) -> Option<&'static DispatchTable> {
        self.base
    }

    /// Returns the thunk of capability `C` in slot `index`, typed as `F`.
    ///
    /// When `C` was overridden by this interface, the slot holds the
    /// overriding capability and the thunk is taken from the closest base
    /// table that still binds `C`.
    ///
    /// # Panics
    ///
    /// Panics if neither this table nor any base table binds `C` at `index`.
    /// This happens when a capability is called on an interface that only
    /// declares another capability of the same name.
    #[inline]
    #[track_caller]
    pub(crate) fn thunk<C: Capability, F: Copy + 'static>(&self, index: usize) -> F {
        let capability = TypeId::of::<C>();
        let mut table = self;
        loop {
            if let Some(entry) = table.slots.get(index)
                && entry.capability == capability
                && let Some(thunk) = entry.erased.downcast_ref::<F>()
            {
                return *thunk;
            }
            match table.base {
                Some(base) => table = base,
                None => self.capability_mismatch(index, core::any::type_name::<C>()),
            }
        }
    }

    /// Reports a call through a slot bound to another capability.
    #[cold]
    #[track_caller]
    fn capability_mismatch(&self, index: usize, requested: &'static str) -> ! {
        panic!(
            "slot {index} (`{}`) of interface `{}` is bound to `{}`, not `{requested}`",
            self.slots[index].name, self.interface, self.slots[index].capability_type_name,
        )
    }
}

impl core::fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DispatchTable")
            .field("interface", &self.interface)
            .field("target", &self.target)
            .field("storage", &self.storage)
            .field("slots", &self.slots)
            .field("base", &self.base.map(|base| base.interface))
            .finish()
    }
}

/// Collects the thunks of a [`DispatchTable`] while it is being built.
///
/// The builder starts out with the slots of the base table, if any. Every
/// installed thunk then either overrides the slot its name already occupies
/// or fills the next fresh slot.
pub struct TableBuilder<'l> {
    /// The layout that decides each thunk's slot.
    layout: &'l Layout,
    /// The slots filled so far.
    slots: Vec<Thunk>,
}

impl<'l> TableBuilder<'l> {
    /// Creates a builder for `layout`, inheriting the slots of `base`.
    fn new(layout: &'l Layout, base: Option<&DispatchTable>) -> Self {
        let mut slots = Vec::with_capacity(layout.len());
        if let Some(base) = base {
            slots.extend_from_slice(&base.slots);
        }
        Self { layout, slots }
    }

    /// Installs `thunk` into the slot its capability name is laid out at.
    pub(crate) fn install(&mut self, thunk: Thunk) {
        let Some(index) = self.layout.index_of(thunk.name) else {
            unreachable!(
                "layout of `{}` has no slot named `{}`",
                self.layout.interface_name(),
                thunk.name
            )
        };

        if let Some(slot) = self.slots.get_mut(index) {
            *slot = thunk;
        } else {
            debug_assert_eq!(index, self.slots.len());
            self.slots.push(thunk);
        }
    }
}
