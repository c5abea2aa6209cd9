//! Append-only maps from keys to leaked entries.

use alloc::boxed::Box;
use core::hash::Hash;
#[cfg(feature = "std")]
use std::sync::{PoisonError, RwLock};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
#[cfg(not(feature = "std"))]
use spin::RwLock;

type Entries<K, V> = HashMap<K, &'static V, FxBuildHasher>;

/// A process-wide map whose entries live until the process exits.
///
/// Entries are never removed or replaced, so a `&'static V` handed out once
/// stays the entry of its key.
pub(crate) struct Store<K, V: 'static> {
    entries: RwLock<Entries<K, V>>,
}

impl<K: Eq + Hash, V: Sync> Store<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(FxBuildHasher)),
        }
    }

    /// Returns the entry of `key`, if any.
    pub(crate) fn get(&self, key: &K) -> Option<&'static V> {
        self.read(|entries| entries.get(key).copied())
    }

    /// Returns the entry of `key`, inserting the value made by `build` if
    /// there is none.
    ///
    /// `build` runs without the lock held, so it may use other stores. When
    /// two threads race on the same key, the first insertion wins and the
    /// other value is dropped.
    pub(crate) fn get_or_insert_with(&self, key: K, build: impl FnOnce() -> V) -> &'static V {
        if let Some(entry) = self.get(&key) {
            return entry;
        }
        let value = build();
        self.write(|entries| *entries.entry(key).or_insert_with(|| Box::leak(Box::new(value))))
    }

    /// Returns the number of entries.
    pub(crate) fn len(&self) -> usize {
        self.read(HashMap::len)
    }

    fn read<R>(&self, f: impl FnOnce(&Entries<K, V>) -> R) -> R {
        // Entries are inserted whole, so a writer that panicked cannot have
        // left the map inconsistent.
        #[cfg(feature = "std")]
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        #[cfg(not(feature = "std"))]
        let entries = self.entries.read();
        f(&entries)
    }

    fn write<R>(&self, f: impl FnOnce(&mut Entries<K, V>) -> R) -> R {
        #[cfg(feature = "std")]
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        #[cfg(not(feature = "std"))]
        let mut entries = self.entries.write();
        f(&mut entries)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn test_first_insertion_wins() {
        static NAMES: Store<u32, String> = Store::new();

        assert!(NAMES.get(&1).is_none());
        let first = NAMES.get_or_insert_with(1, || String::from("one"));
        let second = NAMES.get_or_insert_with(1, || unreachable!("the entry exists"));
        assert!(core::ptr::eq(first, second));
        assert_eq!(second, "one");

        NAMES.get_or_insert_with(2, || String::from("two"));
        assert_eq!(NAMES.len(), 2);
        assert_eq!(NAMES.get(&2).map(String::as_str), Some("two"));
    }
}
