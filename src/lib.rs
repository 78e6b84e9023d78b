//! bucketlru: a weight-bounded cache with bucketed LRU eviction.
//!
//! Entries carry a caller-defined weight. When an insert would push the total
//! past the high watermark, the cache drains down to the low watermark,
//! choosing victims by recency, size and popularity according to its
//! [`Strategy`](strategy::Strategy).
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod admission;
pub mod builder;
pub mod cache;
pub mod clock;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod strategy;
pub mod traits;
