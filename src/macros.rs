/// Declares an interface.
///
/// The macro defines a unit struct and implements [`Interface`] for it. The
/// capabilities are listed in braces, in slot order. An interface extending
/// another one names its base after a colon.
///
/// [`Interface`]: crate::Interface
///
/// # Examples
///
/// ```
/// use polyface::{Capability, Interface, markers::ByRef, registry::Resolution};
///
/// # macro_rules! capability {
/// #     ($name:ident = $tag:literal) => {
/// #         pub struct $name;
/// #         impl Capability for $name {
/// #             const NAME: &'static str = $tag;
/// #             type Receiver = ByRef;
/// #             type Args<'a> = ();
/// #             type Output = ();
/// #         }
/// #     };
/// # }
/// # capability!(Draw = "draw");
/// # capability!(Resize = "resize");
/// # capability!(Rotate = "rotate");
/// polyface::interface! {
///     /// Something that can be drawn and resized.
///     pub struct Shape { Draw, Resize }
/// }
///
/// polyface::interface! {
///     pub struct Turnable: Shape { Rotate }
/// }
///
/// assert_eq!(Turnable::NAME, "Turnable");
/// let layout = polyface::registry::layout::<Turnable>();
/// assert_eq!(layout.index_of("rotate"), Some(2));
/// assert_eq!(
///     layout.get("draw").map(|slot| slot.resolution()),
///     Some(Resolution::Inherited { from: "Shape" })
/// );
/// ```
#[macro_export]
macro_rules! interface {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(: $base:ty)? {
            $($capability:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        $vis struct $name;

        impl $crate::Interface for $name {
            const NAME: &'static str = ::core::stringify!($name);
            type Base = $crate::__interface_base!($($base)?);
            type Capabilities = ($($capability,)*);
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __interface_base {
    () => {
        ()
    };
    ($base:ty) => {
        $base
    };
}
