use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::interface::Chain;

/// How a slot came to be part of an interface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// The interface declares the capability, and no base does.
    Local,
    /// The capability is declared by a base and not redeclared.
    Inherited {
        /// The interface that declared the capability.
        from: &'static str,
    },
    /// The interface redeclares a capability of one of its bases.
    Overridden {
        /// The interface whose declaration is overridden.
        base: &'static str,
    },
}

/// One capability slot of a [`Layout`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot {
    index: usize,
    name: &'static str,
    declared_by: &'static str,
    resolution: Resolution,
}

impl Slot {
    /// Returns the index of the slot in the dispatch table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the capability name bound to the slot.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the name of the interface whose declaration the slot uses.
    #[inline]
    pub fn declared_by(&self) -> &'static str {
        self.declared_by
    }

    /// Returns how the slot was resolved.
    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }
}

/// The slot layout of one interface, including every inherited slot.
///
/// Slots are kept in index order, so iterating over a layout visits the
/// dispatch table from the first slot to the last.
#[derive(Clone, Debug)]
pub struct Layout {
    interface: &'static str,
    slots: IndexMap<&'static str, Slot, FxBuildHasher>,
}

impl Layout {
    /// Resolves the layout described by `chain`.
    pub fn from_chain(chain: &Chain) -> Self {
        let mut builder = match chain.base() {
            Some(base) => LayoutBuilder::extending(chain.interface_name(), &Self::from_chain(base)),
            None => LayoutBuilder::new(chain.interface_name()),
        };
        for &name in chain.local_names() {
            builder.register(name);
        }
        builder.finish()
    }

    /// Returns the name of the interface.
    #[inline]
    pub fn interface_name(&self) -> &'static str {
        self.interface
    }

    /// Returns the number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the layout has no slots.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the slot index of the capability called `name`.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.get_index_of(name)
    }

    /// Returns the slot of the capability called `name`.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Returns the slots, in index order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = &Slot> + '_ {
        self.slots.values()
    }
}

/// Assigns slot indices to capability names, one interface at a time.
///
/// ```
/// use polyface::registry::{LayoutBuilder, Resolution};
///
/// let mut v1 = LayoutBuilder::new("V1");
/// assert_eq!(v1.register("draw"), 0);
/// assert_eq!(v1.register("resize"), 1);
/// assert_eq!(v1.register("draw"), 0);
/// let v1 = v1.finish();
///
/// let mut v2 = LayoutBuilder::extending("V2", &v1);
/// assert_eq!(v2.register("rotate"), 2);
/// assert_eq!(v2.register("draw"), 0);
/// let v2 = v2.finish();
///
/// let draw = v2.get("draw").unwrap();
/// assert_eq!(draw.resolution(), Resolution::Overridden { base: "V1" });
/// assert_eq!(
///     v2.get("resize").unwrap().resolution(),
///     Resolution::Inherited { from: "V1" }
/// );
/// ```
#[derive(Debug)]
pub struct LayoutBuilder {
    layout: Layout,
}

impl LayoutBuilder {
    /// Starts the layout of an interface without a base.
    pub fn new(interface: &'static str) -> Self {
        Self {
            layout: Layout {
                interface,
                slots: IndexMap::default(),
            },
        }
    }

    /// Starts the layout of an interface extending `base`. Every slot of
    /// `base` keeps its index.
    pub fn extending(interface: &'static str, base: &Layout) -> Self {
        let slots = base
            .slots
            .iter()
            .map(|(&name, slot)| {
                let inherited = Slot {
                    resolution: Resolution::Inherited {
                        from: slot.declared_by,
                    },
                    ..*slot
                };
                (name, inherited)
            })
            .collect();

        Self {
            layout: Layout { interface, slots },
        }
    }

    /// Registers the capability `name`, returning its slot.
    ///
    /// The first registration of a name appends a slot. Registering a name
    /// again returns the slot it already has. When the name came from a
    /// base, the slot is marked as overridden.
    pub fn register(&mut self, name: &'static str) -> usize {
        let interface = self.layout.interface;
        let next = self.layout.slots.len();

        let slot = self.layout.slots.entry(name).or_insert(Slot {
            index: next,
            name,
            declared_by: interface,
            resolution: Resolution::Local,
        });

        if slot.declared_by != interface {
            slot.resolution = Resolution::Overridden {
                base: slot.declared_by,
            };
            slot.declared_by = interface;
        }

        slot.index
    }

    /// Finishes the layout.
    pub fn finish(self) -> Layout {
        self.layout
    }
}
