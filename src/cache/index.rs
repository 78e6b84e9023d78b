//! Key → locator index.
//!
//! The index only stores where an entry lives; the entry itself (and its own
//! copy of the key) sits in a bucket node. Two backings are provided:
//!
//! | Index               | Backing                | Key bound       | Lookup   |
//! |---------------------|------------------------|-----------------|----------|
//! | [`HashKeyIndex`]    | `FxHashMap<K, Locator>`| `Eq + Hash`     | O(1) avg |
//! | [`OrderedKeyIndex`] | `BTreeMap<K, Locator>` | `Ord`           | O(log n) |
//!
//! `OrderedKeyIndex` identifies keys by their total order, so a custom
//! comparator is expressed as an `Ord` impl on a key newtype.

use std::collections::BTreeMap;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::SlotId;

/// Where a resident entry lives: its bucket and its node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    pub bucket: usize,
    pub slot: SlotId,
}

/// Map from key to [`Locator`].
pub trait KeyIndex<K> {
    fn with_capacity(capacity: usize) -> Self;
    fn get(&self, key: &K) -> Option<&Locator>;
    fn get_mut(&mut self, key: &K) -> Option<&mut Locator>;
    fn insert(&mut self, key: K, locator: Locator) -> Option<Locator>;
    fn remove(&mut self, key: &K) -> Option<Locator>;
    fn len(&self) -> usize;
    fn clear(&mut self);

    fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hash index; the default.
pub type HashKeyIndex<K> = FxHashMap<K, Locator>;

/// Ordered index.
pub type OrderedKeyIndex<K> = BTreeMap<K, Locator>;

impl<K: Eq + Hash> KeyIndex<K> for FxHashMap<K, Locator> {
    fn with_capacity(capacity: usize) -> Self {
        FxHashMap::with_capacity_and_hasher(capacity, Default::default())
    }

    #[inline]
    fn get(&self, key: &K) -> Option<&Locator> {
        FxHashMap::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: &K) -> Option<&mut Locator> {
        FxHashMap::get_mut(self, key)
    }

    #[inline]
    fn insert(&mut self, key: K, locator: Locator) -> Option<Locator> {
        FxHashMap::insert(self, key, locator)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<Locator> {
        FxHashMap::remove(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        FxHashMap::len(self)
    }

    fn clear(&mut self) {
        FxHashMap::clear(self)
    }
}

impl<K: Ord> KeyIndex<K> for BTreeMap<K, Locator> {
    fn with_capacity(_capacity: usize) -> Self {
        BTreeMap::new()
    }

    #[inline]
    fn get(&self, key: &K) -> Option<&Locator> {
        BTreeMap::get(self, key)
    }

    #[inline]
    fn get_mut(&mut self, key: &K) -> Option<&mut Locator> {
        BTreeMap::get_mut(self, key)
    }

    #[inline]
    fn insert(&mut self, key: K, locator: Locator) -> Option<Locator> {
        BTreeMap::insert(self, key, locator)
    }

    #[inline]
    fn remove(&mut self, key: &K) -> Option<Locator> {
        BTreeMap::remove(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ds::SlotArena;

    fn exercise<I: KeyIndex<u32>>() {
        let mut arena = SlotArena::new();
        let a = Locator {
            bucket: 0,
            slot: arena.insert(()),
        };
        let b = Locator {
            bucket: 3,
            slot: arena.insert(()),
        };

        let mut index = I::with_capacity(4);
        assert!(index.is_empty());
        assert_eq!(index.insert(1, a), None);
        assert_eq!(index.insert(2, b), None);
        assert_eq!(index.len(), 2);
        assert!(index.contains(&1));
        assert_eq!(index.get(&2), Some(&b));

        if let Some(locator) = index.get_mut(&1) {
            locator.bucket = 7;
        }
        assert_eq!(index.get(&1).map(|l| l.bucket), Some(7));

        assert_eq!(index.remove(&2), Some(b));
        assert_eq!(index.remove(&2), None);
        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn hash_index_basic_ops() {
        exercise::<HashKeyIndex<u32>>();
    }

    #[test]
    fn ordered_index_basic_ops() {
        exercise::<OrderedKeyIndex<u32>>();
    }
}
