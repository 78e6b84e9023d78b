//! Operation counters for [`BucketCache`](crate::cache::BucketCache).
//!
//! Recording and snapshotting are split: the cache writes through
//! [`BucketMetricsRecorder`] on its hot paths, and callers read a plain
//! [`BucketCacheMetricsSnapshot`] via `metrics_snapshot()`. The whole module
//! is compiled only with the `metrics` feature.

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::BucketCacheMetrics;
pub use snapshot::BucketCacheMetricsSnapshot;
pub use traits::BucketMetricsRecorder;
