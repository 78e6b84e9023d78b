//! # Weight-Bounded Bucketed LRU Cache
//!
//! [`BucketCache`] bounds the *sum of entry weights* rather than the entry
//! count. Entries are grouped into buckets chosen by a [`Strategy`]; each
//! bucket is an LRU list with the oldest entry at the front.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     BucketCache<K, V, S, W, C, I>                    │
//!   │                                                                      │
//!   │   index: I (KeyIndex<K>)          buckets: BucketLists<Entry>        │
//!   │   ┌───────┬──────────────────┐    ┌──────────────────────────────┐   │
//!   │   │  Key  │ Locator          │    │ 0: [e1] ◄──► [e4]            │   │
//!   │   ├───────┼──────────────────┤    │ 1: (empty)                   │   │
//!   │   │  k1   │ {bucket 0, id_1} │──► │ 2: [e2]                      │   │
//!   │   │  k2   │ {bucket 2, id_2} │    │ …                            │   │
//!   │   │  k4   │ {bucket 0, id_4} │    │ N-1: [e9] ◄──► [e3]          │   │
//!   │   └───────┴──────────────────┘    └──────────────────────────────┘   │
//!   │                                     front = oldest, back = newest    │
//!   │   total_weight   high_watermark   low_watermark                      │
//!   │   strategy: S    size_calculator: W    clock: C                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method            | Complexity        | Effect                                     |
//! |-------------------|-------------------|--------------------------------------------|
//! | `fetch(&k)`       | O(1)              | touch, reclassify, move to back of bucket  |
//! | `peek(&k)`        | O(1)              | read only                                  |
//! | `insert(k, v)`    | O(1) + drain      | weigh, drain if over high, append          |
//! | `erase(&k)`       | O(1)              | unlink, subtract weight                    |
//! | `clear()`         | O(n)              | drop everything                            |
//! | drain (internal)  | O(B + e·log B)    | B = buckets, e = evicted entries           |
//!
//! Complexities assume the default hash index; `OrderedKeyIndex` adds a
//! `log n` factor to key lookups.
//!
//! ## Watermarks
//!
//! When `cache_size() + weight > high_watermark` an insert first drains the
//! cache to `low_watermark - weight` (or empties it when the new entry alone
//! is heavier than `low_watermark`). An entry heavier than `high_watermark`
//! is still admitted; it only leaves through a later drain, `erase` or
//! `clear`.
//!
//! ## Example
//!
//! ```
//! use bucketlru::cache::BucketCache;
//! use bucketlru::strategy::SizeAware;
//!
//! let mut cache = BucketCache::new(100, 50, SizeAware::new(), |v: &Vec<u8>| v.len());
//! let (_, inserted) = cache.insert("a", vec![0; 40]);
//! assert!(inserted);
//! cache.insert("b", vec![0; 40]);
//! cache.insert("c", vec![0; 40]); // 120 > 100: drains to 50 - 40 = 10 first
//!
//! assert_eq!(cache.len(), 1);
//! assert_eq!(cache.cache_size(), 40);
//! assert!(cache.fetch(&"c").is_some());
//! ```

mod entry;
mod evict;
pub mod index;

use std::fmt;
use std::hash::Hash;

pub use evict::DrainReport;
pub use index::{HashKeyIndex, KeyIndex, Locator, OrderedKeyIndex};

use crate::clock::{Clock, MonotonicClock};
use crate::ds::{BucketLists, SlotId};
use crate::error::{InvariantError, NotFoundError};
#[cfg(feature = "metrics")]
use crate::metrics::{BucketCacheMetrics, BucketCacheMetricsSnapshot, BucketMetricsRecorder};
use crate::strategy::Strategy;
use crate::traits::{SizeCalculator, WeightedCache};

use entry::Entry;

/// Weight-bounded cache with strategy-defined buckets.
///
/// - `S`: classification [`Strategy`]
/// - `W`: [`SizeCalculator`] for values
/// - `C`: [`Clock`] used for last-touch stamps
/// - `I`: [`KeyIndex`] backing, [`HashKeyIndex`] by default
pub struct BucketCache<K, V, S, W, C = MonotonicClock, I = HashKeyIndex<K>>
where
    S: Strategy,
{
    buckets: BucketLists<Entry<K, V, S::Meta>>,
    index: I,
    strategy: S,
    size_calculator: W,
    clock: C,
    total_weight: usize,
    high_watermark: usize,
    low_watermark: usize,
    #[cfg(feature = "metrics")]
    metrics: BucketCacheMetrics,
}

impl<K, V, S, W> BucketCache<K, V, S, W>
where
    K: Eq + Hash + Clone,
    S: Strategy,
{
    /// Creates a cache with the monotonic clock and the hash index.
    ///
    /// Watermarks are not validated here; use
    /// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
    /// to reject `low_watermark > high_watermark`.
    pub fn new(high_watermark: usize, low_watermark: usize, strategy: S, size_calculator: W) -> Self {
        Self::with_parts(
            high_watermark,
            low_watermark,
            strategy,
            size_calculator,
            MonotonicClock,
            0,
        )
    }
}

impl<K, V, S, W, C, I> BucketCache<K, V, S, W, C, I>
where
    K: Clone,
    S: Strategy,
    C: Clock,
    I: KeyIndex<K>,
{
    /// Creates a cache from explicit parts; `capacity_hint` pre-sizes the
    /// entry arena and the index.
    pub fn with_parts(
        high_watermark: usize,
        low_watermark: usize,
        strategy: S,
        size_calculator: W,
        clock: C,
        capacity_hint: usize,
    ) -> Self {
        Self {
            buckets: BucketLists::with_capacity(strategy.bucket_count(), capacity_hint),
            index: I::with_capacity(capacity_hint),
            strategy,
            size_calculator,
            clock,
            total_weight: 0,
            high_watermark,
            low_watermark,
            #[cfg(feature = "metrics")]
            metrics: BucketCacheMetrics::default(),
        }
    }

    /// Returns the value for `key` after touching it.
    ///
    /// The touch updates the entry's metadata, lets the strategy reclassify
    /// it, and moves it to the back of its (possibly new) bucket. Never
    /// changes [`cache_size`](Self::cache_size) or [`len`](Self::len) and
    /// never calls the size calculator. The value must not be changed in a
    /// way that alters its weight.
    ///
    /// # Panics
    ///
    /// Panics if the strategy classifies the entry into a bucket at or past
    /// `bucket_count()`, as [`insert`](Self::insert) does. The entry keeps
    /// its previous bucket.
    pub fn fetch(&mut self, key: &K) -> Option<&mut V> {
        let Some(locator) = self.index.get_mut(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_fetch_miss();
            return None;
        };
        let slot = locator.slot;
        let now = self.clock.now();
        let entry = self.buckets.get_mut(slot)?;
        self.strategy.touch(&mut entry.meta, now);
        let bucket = if S::RECLASSIFIES {
            self.strategy.classify(entry.weight, &entry.meta)
        } else {
            locator.bucket
        };

        let relocated = self.buckets.relocate_to_back(slot, bucket);
        assert!(
            relocated,
            "bucket {bucket} out of range for {} buckets",
            self.buckets.bucket_count()
        );

        #[cfg(feature = "metrics")]
        {
            self.metrics.record_fetch_hit();
            if bucket != locator.bucket {
                self.metrics.record_reclassification();
            }
        }

        locator.bucket = bucket;
        self.buckets.get_mut(slot).map(|entry| &mut entry.value)
    }

    /// Like [`fetch`](Self::fetch) but fails with [`NotFoundError`] when the
    /// key is absent.
    pub fn at(&mut self, key: &K) -> Result<&mut V, NotFoundError> {
        self.fetch(key).ok_or(NotFoundError)
    }

    /// Returns the value for `key` without touching it.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let locator = self.index.get(key)?;
        self.buckets.get(locator.slot).map(|entry| &entry.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains(key)
    }

    /// Returns the weight recorded for `key` at insert time.
    pub fn weight_of(&self, key: &K) -> Option<usize> {
        let locator = self.index.get(key)?;
        self.buckets.get(locator.slot).map(|entry| entry.weight)
    }

    /// Returns the bucket `key` currently lives in.
    pub fn bucket_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).map(|locator| locator.bucket)
    }

    /// Inserts `value` under `key` unless the key is already resident.
    ///
    /// A resident entry is returned as-is with `false`: it is not replaced,
    /// not touched and not moved, and the size calculator is not called.
    /// Otherwise the value is weighed, the cache is drained if the new total
    /// would exceed the high watermark, and the entry is appended to the
    /// back of its bucket.
    pub fn insert(&mut self, key: K, value: V) -> (&mut V, bool)
    where
        W: SizeCalculator<V>,
    {
        if let Some(slot) = self.resident_slot(&key) {
            return (self.duplicate(slot), false);
        }
        let weight = self.size_calculator.size_of(&value);
        (self.admit(key, value, weight), true)
    }

    /// Inserts with a caller-supplied weight instead of the size calculator.
    pub fn insert_with_weight(&mut self, key: K, value: V, weight: usize) -> (&mut V, bool) {
        if let Some(slot) = self.resident_slot(&key) {
            return (self.duplicate(slot), false);
        }
        (self.admit(key, value, weight), true)
    }

    /// Inserts with a fallible weigher.
    ///
    /// The weigher runs before anything is mutated, so an `Err` leaves the
    /// cache exactly as it was. Like [`insert`](Self::insert), a resident key
    /// short-circuits without calling the weigher.
    pub fn try_insert_with<E, F>(&mut self, key: K, value: V, weigh: F) -> Result<(&mut V, bool), E>
    where
        F: FnOnce(&V) -> Result<usize, E>,
    {
        if let Some(slot) = self.resident_slot(&key) {
            return Ok((self.duplicate(slot), false));
        }
        let weight = weigh(&value)?;
        Ok((self.admit(key, value, weight), true))
    }

    /// Removes `key`; returns 1 if it was resident and 0 otherwise.
    pub fn erase(&mut self, key: &K) -> usize {
        usize::from(self.remove(key).is_some())
    }

    /// Removes `key` and returns its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let locator = self.index.remove(key)?;
        let entry = self.buckets.remove(locator.slot)?;
        self.total_weight -= entry.weight;

        #[cfg(feature = "metrics")]
        self.metrics.record_erase();

        debug_assert_eq!(self.index.len(), self.buckets.len());
        Some(entry.value)
    }

    /// Drops every entry and resets the weight total.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        self.buckets.clear();
        self.index.clear();
        self.total_weight = 0;
    }

    /// Sum of resident weights.
    #[inline]
    pub fn cache_size(&self) -> usize {
        self.total_weight
    }

    /// Number of resident entries.
    #[inline]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.index.len(), self.buckets.len());
        self.index.len()
    }

    /// Alias of [`len`](Self::len).
    #[inline]
    pub fn size(&self) -> usize {
        self.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn high_watermark(&self) -> usize {
        self.high_watermark
    }

    pub fn low_watermark(&self) -> usize {
        self.low_watermark
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.bucket_count()
    }

    /// Number of entries in `bucket`; 0 for out-of-range buckets.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets.bucket_len(bucket)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Verifies the index/bucket bijection, bucket classification, recency
    /// order and the weight total.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but buckets hold {} entries",
                self.index.len(),
                self.buckets.len()
            )));
        }

        let mut weight = 0usize;
        let mut counted = 0usize;
        for bucket in 0..self.buckets.bucket_count() {
            let mut previous_touch = None;
            for (slot, entry) in self.buckets.iter_entries(bucket) {
                counted += 1;
                weight += entry.weight;

                let expected = Locator { bucket, slot };
                if self.index.get(&entry.key) != Some(&expected) {
                    return Err(InvariantError::new(format!(
                        "entry in bucket {bucket} (slot {}) is not indexed at its location",
                        slot.index()
                    )));
                }

                let class = self.strategy.classify(entry.weight, &entry.meta);
                if class != bucket {
                    return Err(InvariantError::new(format!(
                        "entry of weight {} lives in bucket {bucket} but classifies to {class}",
                        entry.weight
                    )));
                }

                if let Some(touched) = self.strategy.last_touch(&entry.meta) {
                    if previous_touch.is_some_and(|prev| prev > touched) {
                        return Err(InvariantError::new(format!(
                            "bucket {bucket} is not ordered by last touch"
                        )));
                    }
                    previous_touch = Some(touched);
                }
            }
        }

        if counted != self.buckets.len() {
            return Err(InvariantError::new(format!(
                "walked {counted} entries but arena holds {}",
                self.buckets.len()
            )));
        }
        if weight != self.total_weight {
            return Err(InvariantError::new(format!(
                "entry weights sum to {weight} but total_weight is {}",
                self.total_weight
            )));
        }
        Ok(())
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> BucketCacheMetricsSnapshot {
        BucketCacheMetricsSnapshot {
            fetch_calls: self.metrics.fetch_calls,
            fetch_hits: self.metrics.fetch_hits,
            fetch_misses: self.metrics.fetch_misses,
            insert_calls: self.metrics.insert_calls,
            insert_new: self.metrics.insert_new,
            insert_duplicates: self.metrics.insert_duplicates,
            reclassifications: self.metrics.reclassifications,
            erases: self.metrics.erases,
            drain_calls: self.metrics.drain_calls,
            evicted_entries: self.metrics.evicted_entries,
            evicted_weight: self.metrics.evicted_weight,
            clear_calls: self.metrics.clear_calls,
            cache_len: self.index.len(),
            cache_size: self.total_weight,
            high_watermark: self.high_watermark,
            low_watermark: self.low_watermark,
        }
    }

    fn resident_slot(&self, key: &K) -> Option<SlotId> {
        self.index.get(key).map(|locator| locator.slot)
    }

    fn duplicate(&mut self, slot: SlotId) -> &mut V {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_duplicate();

        self.value_mut(slot)
    }

    fn value_mut(&mut self, slot: SlotId) -> &mut V {
        match self.buckets.get_mut(slot) {
            Some(entry) => &mut entry.value,
            None => unreachable!("key index points at a freed slot"),
        }
    }

    fn admit(&mut self, key: K, value: V, weight: usize) -> &mut V {
        let index_key = key.clone();

        match self.total_weight.checked_add(weight) {
            Some(total) if total <= self.high_watermark => {},
            _ => {
                let target = if weight > self.low_watermark {
                    0
                } else {
                    self.low_watermark - weight
                };
                self.drain(target);
            },
        }

        let meta = self.strategy.init(self.clock.now());
        let bucket = self.strategy.classify(weight, &meta);
        let slot = self.buckets.push_back(
            bucket,
            Entry {
                key,
                value,
                weight,
                meta,
            },
        );
        self.total_weight += weight;
        self.index.insert(index_key, Locator { bucket, slot });

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();

        debug_assert_eq!(self.index.len(), self.buckets.len());
        self.value_mut(slot)
    }
}

impl<K, V, S, W, C, I> WeightedCache<K, V> for BucketCache<K, V, S, W, C, I>
where
    K: Clone,
    S: Strategy,
    W: SizeCalculator<V>,
    C: Clock,
    I: KeyIndex<K>,
{
    fn insert(&mut self, key: K, value: V) -> (&mut V, bool) {
        BucketCache::insert(self, key, value)
    }

    fn fetch(&mut self, key: &K) -> Option<&mut V> {
        BucketCache::fetch(self, key)
    }

    fn erase(&mut self, key: &K) -> usize {
        BucketCache::erase(self, key)
    }

    fn clear(&mut self) {
        BucketCache::clear(self)
    }

    fn cache_size(&self) -> usize {
        self.total_weight
    }

    fn len(&self) -> usize {
        BucketCache::len(self)
    }

    fn contains(&self, key: &K) -> bool {
        BucketCache::contains(self, key)
    }
}

impl<K, V, S, W, C, I> fmt::Debug for BucketCache<K, V, S, W, C, I>
where
    S: Strategy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketCache")
            .field("strategy", &S::KIND)
            .field("len", &self.buckets.len())
            .field("buckets", &self.buckets.bucket_count())
            .field("total_weight", &self.total_weight)
            .field("high_watermark", &self.high_watermark)
            .field("low_watermark", &self.low_watermark)
            .finish()
    }
}
