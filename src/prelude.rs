pub use crate::admission::{SemaphoreGuard, WeightSemaphore};
pub use crate::builder::CacheBuilder;
pub use crate::cache::{BucketCache, DrainReport, HashKeyIndex, KeyIndex, OrderedKeyIndex};
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::error::{ConfigError, InvariantError, NotFoundError};
#[cfg(feature = "metrics")]
pub use crate::metrics::BucketCacheMetricsSnapshot;
pub use crate::strategy::{
    Plain, PopularityMeta, SizeAndPopularityAware, SizeAware, SizeAwareMeta, Strategy,
    StrategyKind,
};
pub use crate::traits::{SizeCalculator, UnitWeight, WeightedCache};
