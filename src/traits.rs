//! # Cache Traits
//!
//! ```text
//!   ┌─────────────────────────────────────────────┐
//!   │           WeightedCache<K, V>               │
//!   │                                             │
//!   │  insert(&mut, K, V) → (&mut V, bool)        │
//!   │  fetch(&mut, &K) → Option<&mut V>           │
//!   │  erase(&mut, &K) → usize                    │
//!   │  clear(&mut)                                │
//!   │  cache_size(&) → usize   (total weight)     │
//!   │  len(&) → usize          (entry count)      │
//!   └─────────────────────────────────────────────┘
//!
//!   SizeCalculator<V>: V → weight, called once per value at insert.
//! ```
//!
//! Every mutating method takes `&mut self`; none of the caches in this crate
//! synchronize internally.

/// Computes the weight of a value.
///
/// Implemented for every `Fn(&V) -> usize`, so closures and `fn` items work
/// directly. The calculator is called exactly once per admitted value, before
/// the cache is mutated.
pub trait SizeCalculator<V> {
    fn size_of(&self, value: &V) -> usize;
}

impl<V, F> SizeCalculator<V> for F
where
    F: Fn(&V) -> usize,
{
    #[inline]
    fn size_of(&self, value: &V) -> usize {
        self(value)
    }
}

/// Weighs every value as 1, turning the watermarks into entry counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitWeight;

impl<V> SizeCalculator<V> for UnitWeight {
    #[inline]
    fn size_of(&self, _value: &V) -> usize {
        1
    }
}

/// Operations shared by weight-bounded caches.
pub trait WeightedCache<K, V> {
    /// Inserts `value` unless `key` is already resident.
    ///
    /// Returns the resident value and whether it was inserted. An existing
    /// entry is left untouched.
    fn insert(&mut self, key: K, value: V) -> (&mut V, bool);

    /// Returns the value for `key`, recording the access.
    fn fetch(&mut self, key: &K) -> Option<&mut V>;

    /// Removes `key`; returns the number of entries removed (0 or 1).
    fn erase(&mut self, key: &K) -> usize;

    fn clear(&mut self);

    /// Sum of the weights of all resident entries.
    fn cache_size(&self) -> usize;

    /// Number of resident entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &K) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_size_calculators() {
        let by_len = |s: &String| s.len();
        assert_eq!(by_len.size_of(&"abcd".to_string()), 4);
    }

    #[test]
    fn fn_items_are_size_calculators() {
        fn doubled(v: &u32) -> usize {
            *v as usize * 2
        }
        assert_eq!(SizeCalculator::size_of(&doubled, &21), 42);
    }

    #[test]
    fn unit_weight_is_one() {
        assert_eq!(SizeCalculator::<Vec<u8>>::size_of(&UnitWeight, &vec![0; 1024]), 1);
    }
}
