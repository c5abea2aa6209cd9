//! The runtime error of the crate.
//!
//! Almost everything that can go wrong with an erased value is caught while
//! compiling: a target missing a capability, a target too large for its
//! inline buffer, a call of an undeclared capability and a call whose output
//! does not convert to the requested type are all compile errors. The only
//! failure left for runtime is copying a value that cannot be copied.

use polyface_internals::StorageKind;

/// Copying an erased value needed a deep copy that its target does not
/// allow.
///
/// Returned inside a [`rootcause::Report`] by
/// [`Poly::try_clone`](crate::Poly::try_clone). The value that was being
/// copied is left untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IllegalCopy {
    interface: &'static str,
    target: &'static str,
    storage: StorageKind,
}

impl IllegalCopy {
    pub(crate) fn new(interface: &'static str, target: &'static str, storage: StorageKind) -> Self {
        Self {
            interface,
            target,
            storage,
        }
    }

    /// Returns the name of the interface the value was erased as.
    pub fn interface_name(&self) -> &'static str {
        self.interface
    }

    /// Returns the type name of the target.
    pub fn target_type_name(&self) -> &'static str {
        self.target
    }

    /// Returns the storage kind of the value.
    pub fn storage_kind(&self) -> StorageKind {
        self.storage
    }
}

impl core::fmt::Display for IllegalCopy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.storage == StorageKind::BorrowedMut {
            write!(
                f,
                "cannot copy `{}` erased as `{}`: it is exclusively borrowed",
                self.target, self.interface
            )
        } else {
            write!(
                f,
                "cannot copy `{}` erased as `{}`: it was stored as move-only, and {} storage \
                 deep-copies its target",
                self.target, self.interface, self.storage
            )
        }
    }
}

impl core::error::Error for IllegalCopy {}

#[cfg(test)]
mod tests {
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn test_display() {
        let error = IllegalCopy::new("Drawable", "Square", StorageKind::Inline { capacity: 32 });
        assert_eq!(
            error.to_string(),
            "cannot copy `Square` erased as `Drawable`: it was stored as move-only, and \
             inline(32) storage deep-copies its target"
        );

        let error = IllegalCopy::new("Counter", "u32", StorageKind::BorrowedMut);
        assert_eq!(
            error.to_string(),
            "cannot copy `u32` erased as `Counter`: it is exclusively borrowed"
        );
        assert_eq!(error.storage_kind(), StorageKind::BorrowedMut);
    }

    #[test]
    fn test_is_an_error() {
        static_assertions::assert_impl_all!(IllegalCopy: core::error::Error, Send, Sync, Copy);
    }
}
