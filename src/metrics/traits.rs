/// Counters recorded by a weight-bounded cache.
pub trait BucketMetricsRecorder {
    fn record_fetch_hit(&mut self);
    fn record_fetch_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_duplicate(&mut self);
    fn record_reclassification(&mut self);
    fn record_erase(&mut self);
    fn record_drain(&mut self);
    fn record_evicted_entry(&mut self, weight: usize);
    fn record_clear(&mut self);
}
