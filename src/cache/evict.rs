//! Scored drain.
//!
//! Eviction brings `total_weight` down to a target by repeatedly dropping the
//! front (oldest) entry of some bucket.
//!
//! ```text
//!   Plain strategy: bucket 0 only, strictly oldest first.
//!
//!   Scored strategies: one candidate per non-empty bucket, keyed by
//!
//!       score(bucket b) = age(front of b) · 2^b
//!
//!     heap (max)            buckets
//!     ┌──────────────┐      0: [a] [d]
//!     │ (b=5, 4.0s)  │ ──►  …
//!     │ (b=2, 1.5s)  │      2: [c] [f] [g]
//!     │ (b=0, 0.9s)  │      …
//!     └──────────────┘      5: [e]
//!
//!   pop best → evict its bucket's front → rescore that bucket's new
//!   front and push it back (or drop the bucket once it is empty)
//! ```
//!
//! Only bucket fronts are ever scored, so this approximates "least valuable
//! first" at O(B) to seed and O(log B) per eviction. Equal scores are broken
//! towards the higher bucket. `now` is sampled once per drain.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use tracing::{debug, trace};

use super::BucketCache;
use super::index::KeyIndex;
use crate::clock::Clock;
#[cfg(feature = "metrics")]
use crate::metrics::BucketMetricsRecorder;
use crate::strategy::Strategy;

/// What a drain removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub evicted: usize,
    pub weight: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    score: u128,
    bucket: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.bucket.cmp(&other.bucket))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `age · 2^bucket` in nanoseconds, saturating.
fn score(now: Instant, last_touch: Option<Instant>, bucket: usize) -> u128 {
    let age = last_touch.map_or(0, |touched| now.saturating_duration_since(touched).as_nanos());
    let class = 1u128.checked_shl(bucket as u32).unwrap_or(u128::MAX);
    age.saturating_mul(class)
}

impl<K, V, S, W, C, I> BucketCache<K, V, S, W, C, I>
where
    K: Clone,
    S: Strategy,
    C: Clock,
    I: KeyIndex<K>,
{
    /// Evicts entries until `cache_size() <= target`.
    ///
    /// Uses the same ordering as the drain an over-full insert triggers.
    /// `target == 0` empties the cache.
    pub fn evict_to(&mut self, target: usize) -> DrainReport {
        if self.total_weight <= target {
            return DrainReport::default();
        }
        self.drain(target)
    }

    pub(super) fn drain(&mut self, target: usize) -> DrainReport {
        #[cfg(feature = "metrics")]
        self.metrics.record_drain();

        let before = self.total_weight;
        let report = if target == 0 {
            self.drain_all()
        } else if S::SCORED {
            self.drain_scored(target)
        } else {
            self.drain_oldest(target)
        };

        debug!(
            strategy = %S::KIND,
            target_weight = target,
            before,
            after = self.total_weight,
            evicted = report.evicted,
            evicted_weight = report.weight,
            "drained cache"
        );
        report
    }

    fn drain_all(&mut self) -> DrainReport {
        let report = DrainReport {
            evicted: self.buckets.len(),
            weight: self.total_weight,
        };

        #[cfg(feature = "metrics")]
        for bucket in 0..self.buckets.bucket_count() {
            for entry in self.buckets.iter(bucket) {
                self.metrics.record_evicted_entry(entry.weight);
            }
        }

        self.buckets.clear();
        self.index.clear();
        self.total_weight = 0;
        report
    }

    fn drain_oldest(&mut self, target: usize) -> DrainReport {
        let mut report = DrainReport::default();
        while self.total_weight > target {
            if !self.evict_front(0, &mut report) {
                break;
            }
        }
        report
    }

    fn drain_scored(&mut self, target: usize) -> DrainReport {
        let now = self.clock.now();
        let mut report = DrainReport::default();

        let mut heap: BinaryHeap<Candidate> = (0..self.buckets.bucket_count())
            .filter_map(|bucket| self.candidate(bucket, now))
            .collect();

        while self.total_weight > target {
            let Some(best) = heap.pop() else {
                break;
            };
            if !self.evict_front(best.bucket, &mut report) {
                continue;
            }
            if let Some(next) = self.candidate(best.bucket, now) {
                heap.push(next);
            }
        }
        report
    }

    fn candidate(&self, bucket: usize, now: Instant) -> Option<Candidate> {
        let front = self.buckets.front(bucket)?;
        Some(Candidate {
            score: score(now, self.strategy.last_touch(&front.meta), bucket),
            bucket,
        })
    }

    fn evict_front(&mut self, bucket: usize, report: &mut DrainReport) -> bool {
        let Some(entry) = self.buckets.pop_front(bucket) else {
            return false;
        };
        self.index.remove(&entry.key);
        self.total_weight -= entry.weight;
        report.evicted += 1;
        report.weight += entry.weight;

        #[cfg(feature = "metrics")]
        self.metrics.record_evicted_entry(entry.weight);

        trace!(bucket, weight = entry.weight, "evicted entry");
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::BucketCache;
    use crate::clock::ManualClock;
    use crate::strategy::{Plain, SizeAndPopularityAware, SizeAware};

    type Weighed = fn(&usize) -> usize;

    fn identity(v: &usize) -> usize {
        *v
    }

    fn cache_with<S: Strategy>(
        strategy: S,
        low_watermark: usize,
        clock: ManualClock,
    ) -> BucketCache<u32, usize, S, Weighed, ManualClock> {
        BucketCache::with_parts(1_000, low_watermark, strategy, identity as Weighed, clock, 0)
    }

    fn resident<S: Strategy>(cache: &BucketCache<u32, usize, S, Weighed, ManualClock>) -> Vec<u32> {
        (0..64).filter(|k| cache.contains(k)).collect()
    }

    #[test]
    fn score_scales_age_by_bucket_class() {
        let t0 = Instant::now();
        let now = t0 + Duration::from_nanos(10);
        assert_eq!(score(now, Some(t0), 0), 10);
        assert_eq!(score(now, Some(t0), 3), 80);
        assert_eq!(score(now, None, 5), 0);
        assert_eq!(score(t0, Some(now), 2), 0);
        assert_eq!(score(now, Some(t0), 200), u128::MAX);
    }

    #[test]
    fn candidate_ordering_breaks_ties_towards_higher_bucket() {
        let mut heap = BinaryHeap::new();
        heap.push(Candidate { score: 5, bucket: 1 });
        heap.push(Candidate { score: 5, bucket: 4 });
        heap.push(Candidate { score: 9, bucket: 0 });
        assert_eq!(heap.pop().map(|c| c.bucket), Some(0));
        assert_eq!(heap.pop().map(|c| c.bucket), Some(4));
        assert_eq!(heap.pop().map(|c| c.bucket), Some(1));
    }

    #[test]
    fn scored_drain_prefers_older_entries_at_equal_size() {
        let clock = ManualClock::new();
        let mut cache = cache_with(SizeAware::new(), 1_000, clock.clone());
        // bucket 2 (weight 4) is older, bucket 3 (weight 8) is newer.
        cache.insert(1, 4);
        clock.advance(Duration::from_secs(10));
        cache.insert(2, 8);
        clock.advance(Duration::from_secs(1));

        // age·class: bucket 2 = 11s·4 = 44, bucket 3 = 1s·8 = 8.
        let report = cache.evict_to(8);
        assert_eq!(report, DrainReport { evicted: 1, weight: 4 });
        assert_eq!(resident(&cache), vec![2]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn scored_drain_prefers_larger_entries_at_equal_age() {
        let clock = ManualClock::new();
        let mut cache = cache_with(SizeAware::new(), 1_000, clock.clone());
        cache.insert(1, 4);
        cache.insert(2, 64);
        cache.insert(3, 16);
        clock.advance(Duration::from_secs(1));

        cache.evict_to(30);
        assert_eq!(resident(&cache), vec![1, 3]);
        cache.evict_to(10);
        assert_eq!(resident(&cache), vec![1]);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn scored_drain_rescores_bucket_after_each_eviction() {
        let clock = ManualClock::new();
        let mut cache = cache_with(SizeAware::new(), 1_000, clock.clone());
        // bucket 1: two old entries; bucket 4: one entry touched later.
        cache.insert(1, 2);
        cache.insert(2, 3);
        clock.advance(Duration::from_secs(100));
        cache.insert(3, 16);
        clock.advance(Duration::from_secs(1));

        // bucket 1 front: 101s·2 = 202; bucket 4: 1s·16 = 16.
        // After evicting key 1, key 2 scores 202 again and goes next.
        cache.evict_to(16);
        assert_eq!(resident(&cache), vec![3]);
        assert_eq!(cache.cache_size(), 16);
    }

    #[test]
    fn drain_stops_as_soon_as_target_is_met() {
        let clock = ManualClock::new();
        let mut cache = cache_with(SizeAware::new(), 1_000, clock.clone());
        for key in 0..10u32 {
            cache.insert(key, 8);
            clock.advance(Duration::from_millis(1));
        }
        let report = cache.evict_to(50);
        assert_eq!(report.evicted, 4);
        assert_eq!(cache.cache_size(), 48);
        assert_eq!(resident(&cache), (4..10).collect::<Vec<_>>());
    }

    #[test]
    fn evict_to_zero_clears() {
        let mut cache = cache_with(SizeAndPopularityAware::new(), 500, ManualClock::new());
        for key in 0..5u32 {
            cache.insert(key, 10);
        }
        let report = cache.evict_to(0);
        assert_eq!(report, DrainReport { evicted: 5, weight: 50 });
        assert!(cache.is_empty());
        assert_eq!(cache.cache_size(), 0);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn evict_to_above_size_is_noop() {
        let mut cache = cache_with(Plain, 500, ManualClock::new());
        cache.insert(1, 10);
        assert_eq!(cache.evict_to(10), DrainReport::default());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn plain_drain_pops_oldest_even_when_recently_inserted_is_heavier() {
        let mut cache = cache_with(Plain, 500, ManualClock::new());
        cache.insert(1, 5);
        cache.insert(2, 500);
        cache.insert(3, 5);
        cache.evict_to(505);
        assert_eq!(resident(&cache), vec![2, 3]);
    }
}
