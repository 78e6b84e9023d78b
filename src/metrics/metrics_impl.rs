use crate::metrics::traits::BucketMetricsRecorder;

#[derive(Debug, Default, Clone)]
pub struct BucketCacheMetrics {
    pub fetch_calls: u64,
    pub fetch_hits: u64,
    pub fetch_misses: u64,
    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_duplicates: u64,
    pub reclassifications: u64,
    pub erases: u64,
    pub drain_calls: u64,
    pub evicted_entries: u64,
    pub evicted_weight: u64,
    pub clear_calls: u64,
}

impl BucketMetricsRecorder for BucketCacheMetrics {
    fn record_fetch_hit(&mut self) {
        self.fetch_calls += 1;
        self.fetch_hits += 1;
    }

    fn record_fetch_miss(&mut self) {
        self.fetch_calls += 1;
        self.fetch_misses += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_calls += 1;
        self.insert_new += 1;
    }

    fn record_insert_duplicate(&mut self) {
        self.insert_calls += 1;
        self.insert_duplicates += 1;
    }

    fn record_reclassification(&mut self) {
        self.reclassifications += 1;
    }

    fn record_erase(&mut self) {
        self.erases += 1;
    }

    fn record_drain(&mut self) {
        self.drain_calls += 1;
    }

    fn record_evicted_entry(&mut self, weight: usize) {
        self.evicted_entries += 1;
        self.evicted_weight += weight as u64;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_counters_split_hits_and_misses() {
        let mut metrics = BucketCacheMetrics::default();
        metrics.record_fetch_hit();
        metrics.record_fetch_hit();
        metrics.record_fetch_miss();
        assert_eq!(metrics.fetch_calls, 3);
        assert_eq!(metrics.fetch_hits, 2);
        assert_eq!(metrics.fetch_misses, 1);
    }

    #[test]
    fn evictions_accumulate_weight() {
        let mut metrics = BucketCacheMetrics::default();
        metrics.record_drain();
        metrics.record_evicted_entry(10);
        metrics.record_evicted_entry(32);
        assert_eq!(metrics.drain_calls, 1);
        assert_eq!(metrics.evicted_entries, 2);
        assert_eq!(metrics.evicted_weight, 42);
    }
}
