//! Bucket classification strategies.
//!
//! A [`Strategy`] decides how many buckets a cache has, which bucket an entry
//! belongs in, and what metadata each entry carries. Classification is a pure
//! function of an entry's weight and metadata. It runs when the entry is
//! inserted and again on every touch, never on a timer.
//!
//! | Strategy                   | Buckets | Metadata             | Bucket index                          |
//! |----------------------------|---------|----------------------|---------------------------------------|
//! | [`Plain`]                  | 1       | none                 | 0                                     |
//! | [`SizeAware`]              | N (32)  | last touch           | `min(log2(weight), N-1)`              |
//! | [`SizeAndPopularityAware`] | N (32)  | last touch, hits     | `min(log2(weight) - log2(hits), N-1)` |
//!
//! A weight of 0 always maps to bucket 0. Subtraction saturates at 0.
//!
//! Higher buckets hold entries that are cheaper to lose per unit of weight
//! freed, and the eviction engine weights their age by `2^bucket`.

use std::fmt;
use std::time::Instant;

use crate::error::ConfigError;

/// Default bucket count for the size-classifying strategies.
pub const DEFAULT_BUCKETS: usize = 32;

/// Upper bound on buckets; keeps the `2^bucket` score multiplier in range.
pub const MAX_BUCKETS: usize = 64;

/// Names a strategy variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Plain,
    SizeAware,
    SizeAndPopularityAware,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Plain => "plain",
            StrategyKind::SizeAware => "size-aware",
            StrategyKind::SizeAndPopularityAware => "size-and-popularity-aware",
        })
    }
}

/// Classification policy of a [`BucketCache`](crate::cache::BucketCache).
pub trait Strategy {
    /// Per-entry metadata.
    type Meta: fmt::Debug;

    const KIND: StrategyKind;

    /// `true` when entries carry a last-touch stamp and are evicted by the
    /// scored drain; `false` drains bucket 0 oldest-first.
    const SCORED: bool;

    /// `true` when a touch may move an entry to another bucket.
    const RECLASSIFIES: bool;

    fn bucket_count(&self) -> usize;

    /// Metadata for a freshly inserted entry.
    fn init(&self, now: Instant) -> Self::Meta;

    /// Records an access.
    fn touch(&self, meta: &mut Self::Meta, now: Instant);

    /// Bucket for an entry with `weight` and `meta`; always `< bucket_count()`.
    fn classify(&self, weight: usize, meta: &Self::Meta) -> usize;

    /// Last access time, for strategies that track one.
    fn last_touch(&self, meta: &Self::Meta) -> Option<Instant>;
}

#[inline]
fn floor_log2(n: u64) -> usize {
    n.ilog2() as usize
}

/// Range check shared by the built-in constructors and
/// [`CacheBuilder`](crate::builder::CacheBuilder), which applies it to custom
/// [`Strategy`] impls as well.
pub(crate) fn check_bucket_count(buckets: usize) -> Result<usize, ConfigError> {
    if buckets == 0 {
        return Err(ConfigError::new("bucket count must be > 0"));
    }
    if buckets > MAX_BUCKETS {
        return Err(ConfigError::new(format!(
            "bucket count must be <= {MAX_BUCKETS}, got {buckets}"
        )));
    }
    Ok(buckets)
}

// ---------------------------------------------------------------------------
// Plain
// ---------------------------------------------------------------------------

/// Plain LRU: one bucket, no metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl Strategy for Plain {
    type Meta = ();

    const KIND: StrategyKind = StrategyKind::Plain;
    const SCORED: bool = false;
    const RECLASSIFIES: bool = false;

    #[inline]
    fn bucket_count(&self) -> usize {
        1
    }

    #[inline]
    fn init(&self, _now: Instant) -> Self::Meta {}

    #[inline]
    fn touch(&self, _meta: &mut Self::Meta, _now: Instant) {}

    #[inline]
    fn classify(&self, _weight: usize, _meta: &Self::Meta) -> usize {
        0
    }

    #[inline]
    fn last_touch(&self, _meta: &Self::Meta) -> Option<Instant> {
        None
    }
}

// ---------------------------------------------------------------------------
// SizeAware
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeAwareMeta {
    pub last_touch: Instant,
}

/// Buckets entries by weight magnitude; favours evicting large entries.
#[derive(Debug, Clone, Copy)]
pub struct SizeAware {
    buckets: usize,
}

impl SizeAware {
    pub fn new() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
        }
    }

    /// # Panics
    ///
    /// Panics if `buckets` is 0 or greater than [`MAX_BUCKETS`].
    pub fn with_buckets(buckets: usize) -> Self {
        match Self::try_with_buckets(buckets) {
            Ok(strategy) => strategy,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_buckets(buckets: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            buckets: check_bucket_count(buckets)?,
        })
    }
}

impl Default for SizeAware {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SizeAware {
    type Meta = SizeAwareMeta;

    const KIND: StrategyKind = StrategyKind::SizeAware;
    const SCORED: bool = true;
    const RECLASSIFIES: bool = true;

    #[inline]
    fn bucket_count(&self) -> usize {
        self.buckets
    }

    #[inline]
    fn init(&self, now: Instant) -> Self::Meta {
        SizeAwareMeta { last_touch: now }
    }

    #[inline]
    fn touch(&self, meta: &mut Self::Meta, now: Instant) {
        meta.last_touch = now;
    }

    fn classify(&self, weight: usize, _meta: &Self::Meta) -> usize {
        if weight == 0 {
            return 0;
        }
        floor_log2(weight as u64).min(self.buckets - 1)
    }

    #[inline]
    fn last_touch(&self, meta: &Self::Meta) -> Option<Instant> {
        Some(meta.last_touch)
    }
}

// ---------------------------------------------------------------------------
// SizeAndPopularityAware
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularityMeta {
    pub last_touch: Instant,
    /// Accesses including the insert; starts at 1.
    pub hits: u64,
}

/// Buckets entries by weight per hit; favours evicting large, rarely hit
/// entries.
#[derive(Debug, Clone, Copy)]
pub struct SizeAndPopularityAware {
    buckets: usize,
}

impl SizeAndPopularityAware {
    pub fn new() -> Self {
        Self {
            buckets: DEFAULT_BUCKETS,
        }
    }

    /// # Panics
    ///
    /// Panics if `buckets` is 0 or greater than [`MAX_BUCKETS`].
    pub fn with_buckets(buckets: usize) -> Self {
        match Self::try_with_buckets(buckets) {
            Ok(strategy) => strategy,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_with_buckets(buckets: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            buckets: check_bucket_count(buckets)?,
        })
    }
}

impl Default for SizeAndPopularityAware {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for SizeAndPopularityAware {
    type Meta = PopularityMeta;

    const KIND: StrategyKind = StrategyKind::SizeAndPopularityAware;
    const SCORED: bool = true;
    const RECLASSIFIES: bool = true;

    #[inline]
    fn bucket_count(&self) -> usize {
        self.buckets
    }

    #[inline]
    fn init(&self, now: Instant) -> Self::Meta {
        PopularityMeta {
            last_touch: now,
            hits: 1,
        }
    }

    #[inline]
    fn touch(&self, meta: &mut Self::Meta, now: Instant) {
        meta.last_touch = now;
        meta.hits = meta.hits.saturating_add(1);
    }

    fn classify(&self, weight: usize, meta: &Self::Meta) -> usize {
        if weight == 0 {
            return 0;
        }
        let size_class = floor_log2(weight as u64);
        let popularity = floor_log2(meta.hits.max(1));
        size_class
            .saturating_sub(popularity)
            .min(self.buckets - 1)
    }

    #[inline]
    fn last_touch(&self, meta: &Self::Meta) -> Option<Instant> {
        Some(meta.last_touch)
    }
}
