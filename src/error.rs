//! Error types for the bucketlru library.
//!
//! ## Key Components
//!
//! - [`NotFoundError`]: Returned by [`BucketCache::at`](crate::cache::BucketCache::at)
//!   when the key is not resident. [`fetch`](crate::cache::BucketCache::fetch)
//!   reports absence with `None` instead.
//! - [`ConfigError`]: Returned when cache configuration is invalid
//!   (e.g. `low_watermark > high_watermark`, zero buckets).
//! - [`InvariantError`]: Returned by `check_invariants` when the index,
//!   buckets and weight total disagree.
//!
//! ## Example Usage
//!
//! ```
//! use bucketlru::builder::CacheBuilder;
//! use bucketlru::error::ConfigError;
//! use bucketlru::strategy::Plain;
//!
//! let bad = CacheBuilder::new(10, 20)
//!     .strategy(Plain)
//!     .size_calculator(|v: &u32| *v as usize)
//!     .try_build::<u32, u32>();
//! let err: ConfigError = bad.unwrap_err();
//! assert!(err.to_string().contains("low_watermark"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// NotFoundError
// ---------------------------------------------------------------------------

/// Error returned when a key is required to be resident but is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotFoundError;

impl NotFoundError {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        "key not found in cache"
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`BucketCache::check_invariants`](crate::cache::BucketCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build)
/// and the `try_with_buckets` strategy constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}
