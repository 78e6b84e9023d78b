//! Validated construction for [`BucketCache`].
//!
//! [`BucketCache::new`] accepts any watermarks as given. The builder checks
//! the configuration first and reports problems as a [`ConfigError`].
//!
//! ## Example
//!
//! ```rust
//! use bucketlru::builder::CacheBuilder;
//! use bucketlru::strategy::SizeAware;
//!
//! let mut cache = CacheBuilder::new(1024, 512)
//!     .strategy(SizeAware::new())
//!     .size_calculator(|v: &String| v.len())
//!     .build::<u64, String>();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.cache_size(), 5);
//! ```

use std::hash::Hash;

use tracing::debug;

use crate::cache::{BucketCache, KeyIndex, OrderedKeyIndex};
use crate::clock::{Clock, MonotonicClock};
use crate::error::ConfigError;
use crate::strategy::{Plain, Strategy, check_bucket_count};
use crate::traits::UnitWeight;

/// Builder for [`BucketCache`].
///
/// Defaults: [`Plain`] strategy, [`UnitWeight`] sizes, [`MonotonicClock`].
#[derive(Debug, Clone)]
pub struct CacheBuilder<S = Plain, W = UnitWeight, C = MonotonicClock> {
    high_watermark: usize,
    low_watermark: usize,
    strategy: S,
    size_calculator: W,
    clock: C,
    capacity_hint: usize,
}

impl CacheBuilder {
    /// Starts a builder with the given watermarks.
    pub fn new(high_watermark: usize, low_watermark: usize) -> Self {
        Self {
            high_watermark,
            low_watermark,
            strategy: Plain,
            size_calculator: UnitWeight,
            clock: MonotonicClock,
            capacity_hint: 0,
        }
    }
}

impl<S, W, C> CacheBuilder<S, W, C> {
    pub fn strategy<S2: Strategy>(self, strategy: S2) -> CacheBuilder<S2, W, C> {
        CacheBuilder {
            high_watermark: self.high_watermark,
            low_watermark: self.low_watermark,
            strategy,
            size_calculator: self.size_calculator,
            clock: self.clock,
            capacity_hint: self.capacity_hint,
        }
    }

    pub fn size_calculator<W2>(self, size_calculator: W2) -> CacheBuilder<S, W2, C> {
        CacheBuilder {
            high_watermark: self.high_watermark,
            low_watermark: self.low_watermark,
            strategy: self.strategy,
            size_calculator,
            clock: self.clock,
            capacity_hint: self.capacity_hint,
        }
    }

    pub fn clock<C2: Clock>(self, clock: C2) -> CacheBuilder<S, W, C2> {
        CacheBuilder {
            high_watermark: self.high_watermark,
            low_watermark: self.low_watermark,
            strategy: self.strategy,
            size_calculator: self.size_calculator,
            clock,
            capacity_hint: self.capacity_hint,
        }
    }

    /// Pre-sizes the entry arena and the key index.
    pub fn capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = capacity;
        self
    }
}

impl<S, W, C> CacheBuilder<S, W, C>
where
    S: Strategy,
    C: Clock,
{
    /// Builds a hash-indexed cache, rejecting invalid configuration.
    pub fn try_build<K, V>(self) -> Result<BucketCache<K, V, S, W, C>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.validate()?;
        Ok(self.assemble())
    }

    /// Builds a cache whose index orders keys by their `Ord` impl.
    pub fn try_build_ordered<K, V>(
        self,
    ) -> Result<BucketCache<K, V, S, W, C, OrderedKeyIndex<K>>, ConfigError>
    where
        K: Ord + Clone,
    {
        self.validate()?;
        Ok(self.assemble())
    }

    /// Like [`try_build`](Self::try_build) but panics on invalid configuration.
    ///
    /// # Panics
    ///
    /// Panics if `low_watermark > high_watermark` or the strategy's bucket
    /// count is out of range.
    pub fn build<K, V>(self) -> BucketCache<K, V, S, W, C>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let result = if self.low_watermark > self.high_watermark {
            Err(ConfigError::new(format!(
                "low_watermark ({}) must not exceed high_watermark ({})",
                self.low_watermark, self.high_watermark
            )))
        } else {
            check_bucket_count(self.strategy.bucket_count()).map(|_| ())
        };

        if let Err(err) = &result {
            debug!(strategy = %S::KIND, error = %err, "rejected cache configuration");
        }
        result
    }

    fn assemble<K, V, I>(self) -> BucketCache<K, V, S, W, C, I>
    where
        K: Clone,
        I: KeyIndex<K>,
    {
        BucketCache::with_parts(
            self.high_watermark,
            self.low_watermark,
            self.strategy,
            self.size_calculator,
            self.clock,
            self.capacity_hint,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::clock::ManualClock;
    use crate::strategy::{MAX_BUCKETS, SizeAndPopularityAware, SizeAware, StrategyKind};

    struct FixedBuckets(usize);

    impl Strategy for FixedBuckets {
        type Meta = ();

        const KIND: StrategyKind = StrategyKind::Plain;
        const SCORED: bool = false;
        const RECLASSIFIES: bool = false;

        fn bucket_count(&self) -> usize {
            self.0
        }

        fn init(&self, _now: Instant) {}

        fn touch(&self, _meta: &mut (), _now: Instant) {}

        fn classify(&self, _weight: usize, _meta: &()) -> usize {
            0
        }

        fn last_touch(&self, _meta: &()) -> Option<Instant> {
            None
        }
    }

    #[test]
    fn defaults_to_plain_unit_weight() {
        let mut cache = CacheBuilder::new(3, 2).build::<u32, &str>();
        cache.insert(1, "a");
        cache.insert(2, "b");
        cache.insert(3, "c");
        assert_eq!(cache.cache_size(), 3);
        cache.insert(4, "d");
        // unit weights: drains to 2 - 1 = 1 before admitting key 4
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&3));
        assert!(cache.contains(&4));
        assert_eq!(cache.bucket_count(), 1);
    }

    #[test]
    fn rejects_inverted_watermarks() {
        let err = CacheBuilder::new(10, 20).try_build::<u32, u32>().unwrap_err();
        assert!(err.message().contains("low_watermark"));
    }

    #[test]
    fn equal_watermarks_are_valid() {
        assert!(CacheBuilder::new(10, 10).try_build::<u32, u32>().is_ok());
    }

    #[test]
    #[should_panic(expected = "low_watermark")]
    fn build_panics_on_invalid_config() {
        let _ = CacheBuilder::new(1, 2).build::<u32, u32>();
    }

    #[test]
    fn carries_strategy_calculator_and_clock() {
        let clock = ManualClock::new();
        let mut cache = CacheBuilder::new(10_000, 5_000)
            .strategy(SizeAware::with_buckets(8))
            .size_calculator(|v: &Vec<u8>| v.len())
            .clock(clock.clone())
            .capacity_hint(64)
            .build::<u32, Vec<u8>>();

        cache.insert(1, vec![0; 1 << 12]);
        assert_eq!(cache.bucket_count(), 8);
        assert_eq!(cache.bucket_of(&1), Some(7));
        clock.advance(Duration::from_millis(5));
        assert_eq!(cache.clock().elapsed(), Duration::from_millis(5));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn ordered_build_uses_key_order() {
        let mut cache = CacheBuilder::new(100, 50)
            .strategy(SizeAndPopularityAware::new())
            .size_calculator(|v: &u32| *v as usize)
            .try_build_ordered::<String, u32>()
            .unwrap();
        cache.insert("b".to_string(), 10);
        assert!(cache.contains(&"b".to_string()));
        assert_eq!(cache.fetch(&"b".to_string()), Some(&mut 10));
    }

    #[test]
    fn rejects_custom_strategy_bucket_count_out_of_range() {
        for buckets in [0, MAX_BUCKETS + 1] {
            let err = CacheBuilder::new(10, 5)
                .strategy(FixedBuckets(buckets))
                .try_build::<u32, u32>()
                .unwrap_err();
            assert!(err.message().contains("bucket count"), "{err}");
        }
        assert!(
            CacheBuilder::new(10, 5)
                .strategy(FixedBuckets(MAX_BUCKETS))
                .try_build::<u32, u32>()
                .is_ok()
        );
    }
}
