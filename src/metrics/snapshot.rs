#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BucketCacheMetricsSnapshot {
    pub fetch_calls: u64,
    pub fetch_hits: u64,
    pub fetch_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_duplicates: u64,

    // fetches that moved an entry to a different bucket
    pub reclassifications: u64,
    pub erases: u64,

    pub drain_calls: u64,
    pub evicted_entries: u64,
    pub evicted_weight: u64,
    pub clear_calls: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub cache_size: usize,
    pub high_watermark: usize,
    pub low_watermark: usize,
}

impl BucketCacheMetricsSnapshot {
    /// Fraction of fetches that found their key; 0.0 before any fetch.
    pub fn hit_rate(&self) -> f64 {
        if self.fetch_calls == 0 {
            0.0
        } else {
            self.fetch_hits as f64 / self.fetch_calls as f64
        }
    }
}
