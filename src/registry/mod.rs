//! The process-wide slot and dispatch-table registries.
//!
//! Both registries are append-only: a layout or table is built the first
//! time it is needed, leaked, and handed out as a `&'static` reference for
//! the rest of the process. Lookups take a read lock, and only inserting a
//! freshly built entry takes the write lock. Calls through an erased value
//! never reach the registry at all, since the value keeps a reference to its
//! table.
//!
//! ```
//! use polyface::{Capability, markers::ByRef, registry};
//!
//! struct Draw;
//!
//! impl Capability for Draw {
//!     const NAME: &'static str = "draw";
//!     type Receiver = ByRef;
//!     type Args<'a> = ();
//!     type Output = ();
//! }
//!
//! polyface::interface! { struct Drawable { Draw } }
//!
//! let layout = registry::layout::<Drawable>();
//! assert_eq!(layout.index_of("draw"), Some(0));
//! assert_eq!(registry::slot_count::<Drawable>(), 1);
//! assert!(core::ptr::eq(layout, registry::layout::<Drawable>()));
//! ```

mod layout;
mod store;

use core::any::TypeId;

use polyface_internals::StorageKind;

pub use self::layout::{Layout, LayoutBuilder, Resolution, Slot};
use self::store::Store;
use crate::{
    capability::SatisfiedBy,
    interface::{Chain, Interface},
    table::DispatchTable,
};

/// Identifies one dispatch table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct TableKey {
    interface: TypeId,
    target: TypeId,
    storage: StorageKind,
}

static LAYOUTS: Store<TypeId, Layout> = Store::new();

static TABLES: Store<TableKey, DispatchTable> = Store::new();

/// Returns the slot layout of the interface `I`.
pub fn layout<I: Interface>() -> &'static Layout {
    LAYOUTS.get_or_insert_with(TypeId::of::<I>(), || {
        let layout = Layout::from_chain(Chain::of::<I>());
        tracing::debug!(interface = I::NAME, slots = layout.len(), "registered interface layout");
        layout
    })
}

/// Returns the number of slots of the interface `I`, including inherited
/// ones.
#[inline]
pub fn slot_count<I: Interface>() -> usize {
    const { Chain::of::<I>().len() }
}

/// Returns the table of `I` for targets of type `T` stored with `storage`,
/// building it on first use.
///
/// `base` must be the table of `I`'s base interface for the same target and
/// storage.
pub(crate) fn dispatch_table<I, T>(
    storage: StorageKind,
    base: Option<&'static DispatchTable>,
) -> &'static DispatchTable
where
    I: Interface,
    T: 'static,
    I::Capabilities: SatisfiedBy<T>,
{
    let key = TableKey {
        interface: TypeId::of::<I>(),
        target: TypeId::of::<T>(),
        storage,
    };
    TABLES.get_or_insert_with(key, || {
        let table = DispatchTable::build::<I, T>(layout::<I>(), storage, base);
        tracing::debug!(
            interface = I::NAME,
            target = table.target_type_name(),
            %storage,
            "built dispatch table"
        );
        table
    })
}

/// Returns the number of dispatch tables built so far.
pub fn table_count() -> usize {
    TABLES.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capability, Implementation, markers::ByRef};

    struct Tag;

    impl Capability for Tag {
        const NAME: &'static str = "tag";
        type Receiver = ByRef;
        type Args<'a> = ();
        type Output = &'static str;
    }

    impl Implementation<u16> for Tag {
        fn invoke<'a>(_: &'a u16, (): ()) -> &'static str {
            "u16"
        }
    }

    impl Implementation<i16> for Tag {
        fn invoke<'a>(_: &'a i16, (): ()) -> &'static str {
            "i16"
        }
    }

    struct Tagged;

    impl Interface for Tagged {
        const NAME: &'static str = "Tagged";
        type Base = ();
        type Capabilities = (Tag,);
    }

    #[test]
    fn test_layout_is_registered_once() {
        let first = layout::<Tagged>();
        let second = layout::<Tagged>();
        assert!(core::ptr::eq(first, second));
        assert_eq!(slot_count::<Tagged>(), 1);
    }

    #[test]
    fn test_tables_are_keyed_by_target_and_storage() {
        let heap = dispatch_table::<Tagged, u16>(StorageKind::Heap, None);
        let again = dispatch_table::<Tagged, u16>(StorageKind::Heap, None);
        let shared = dispatch_table::<Tagged, u16>(StorageKind::Shared, None);
        let signed = dispatch_table::<Tagged, i16>(StorageKind::Heap, None);

        assert!(core::ptr::eq(heap, again));
        assert!(!core::ptr::eq(heap, shared));
        assert!(!core::ptr::eq(heap, signed));
        assert_eq!(shared.storage_kind(), StorageKind::Shared);
        assert_eq!(signed.target_type_name(), "i16");
        assert!(table_count() >= 3);
    }
}
