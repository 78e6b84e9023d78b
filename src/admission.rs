//! Weight-based admission control.
//!
//! [`WeightSemaphore`] is a counting semaphore over weight units. Producers
//! acquire the weight of a value before building it and release it once the
//! value is dropped or handed to a cache, which bounds the weight in flight
//! across threads. The cache itself stays single-threaded.
//!
//! ```text
//!   acquire(n) ──► [ in_use == 0 ?  admit ]
//!                  [ in_use + n <= capacity ? admit ]
//!                  [ otherwise wait on condvar ]
//!   release(n) ──► in_use -= n; wake all waiters
//! ```
//!
//! A request larger than `capacity` is admitted as soon as nothing else is
//! held. Without that rule such a request would wait forever.
//!
//! ## Example
//!
//! ```
//! use bucketlru::admission::WeightSemaphore;
//!
//! let sem = WeightSemaphore::new(10);
//! {
//!     let _held = sem.acquire_guard(15); // oversized, admitted while idle
//!     assert_eq!(sem.in_use(), 15);
//!     assert!(!sem.try_acquire(1));
//! }
//! assert_eq!(sem.in_use(), 0);
//! ```

use parking_lot::{Condvar, Mutex};

/// Counting semaphore measured in weight units.
#[derive(Debug)]
pub struct WeightSemaphore {
    capacity: usize,
    in_use: Mutex<usize>,
    released: Condvar,
}

impl WeightSemaphore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    #[inline]
    fn has_room(capacity: usize, in_use: usize, weight: usize) -> bool {
        in_use == 0 || in_use.saturating_add(weight) <= capacity
    }

    /// Blocks until `weight` units can be taken, then takes them.
    pub fn acquire(&self, weight: usize) {
        let mut in_use = self.in_use.lock();
        self.released
            .wait_while(&mut in_use, |held| !Self::has_room(self.capacity, *held, weight));
        *in_use += weight;
    }

    /// Takes `weight` units if that is possible right now.
    ///
    /// Returns `false` without waiting when there is no room or when another
    /// thread holds the internal lock.
    pub fn try_acquire(&self, weight: usize) -> bool {
        let Some(mut in_use) = self.in_use.try_lock() else {
            return false;
        };
        if !Self::has_room(self.capacity, *in_use, weight) {
            return false;
        }
        *in_use += weight;
        true
    }

    /// Returns `weight` units and wakes every waiter.
    pub fn release(&self, weight: usize) {
        let mut in_use = self.in_use.lock();
        debug_assert!(weight <= *in_use, "released {weight} but only {} held", *in_use);
        *in_use = in_use.saturating_sub(weight);
        self.released.notify_all();
    }

    /// Acquires `weight` units and releases them when the guard drops.
    pub fn acquire_guard(&self, weight: usize) -> SemaphoreGuard<'_> {
        self.acquire(weight);
        SemaphoreGuard { sem: self, weight }
    }

    /// Non-blocking [`acquire_guard`](Self::acquire_guard).
    pub fn try_acquire_guard(&self, weight: usize) -> Option<SemaphoreGuard<'_>> {
        self.try_acquire(weight)
            .then(|| SemaphoreGuard { sem: self, weight })
    }

    pub fn in_use(&self) -> usize {
        *self.in_use.lock()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Holds units of a [`WeightSemaphore`] until dropped.
#[must_use = "dropping the guard releases the weight immediately"]
#[derive(Debug)]
pub struct SemaphoreGuard<'a> {
    sem: &'a WeightSemaphore,
    weight: usize,
}

impl SemaphoreGuard<'_> {
    pub fn weight(&self) -> usize {
        self.weight
    }
}

impl Drop for SemaphoreGuard<'_> {
    fn drop(&mut self) {
        self.sem.release(self.weight);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn admits_within_capacity() {
        let sem = WeightSemaphore::new(10);
        sem.acquire(4);
        assert!(sem.try_acquire(6));
        assert!(!sem.try_acquire(1));
        assert_eq!(sem.in_use(), 10);
        sem.release(10);
        assert_eq!(sem.in_use(), 0);
    }

    #[test]
    fn oversized_request_admitted_when_idle() {
        let sem = WeightSemaphore::new(10);
        sem.acquire(15);
        assert_eq!(sem.in_use(), 15);
        assert!(!sem.try_acquire(5));
        sem.release(15);

        assert!(sem.try_acquire(15));
        assert_eq!(sem.in_use(), 15);
        sem.release(15);
    }

    #[test]
    fn try_acquire_fails_while_lock_is_held() {
        let sem = WeightSemaphore::new(10);
        let held = sem.in_use.lock();
        assert!(!sem.try_acquire(1));
        drop(held);
        assert!(sem.try_acquire(1));
    }

    #[test]
    fn guard_releases_on_drop() {
        let sem = WeightSemaphore::new(8);
        {
            let guard = sem.acquire_guard(5);
            assert_eq!(guard.weight(), 5);
            assert!(sem.try_acquire_guard(4).is_none());
            let small = sem.try_acquire_guard(3);
            assert!(small.is_some());
            assert_eq!(sem.in_use(), 8);
        }
        assert_eq!(sem.in_use(), 0);
        assert_eq!(sem.capacity(), 8);
    }

    #[test]
    fn acquire_blocks_until_release() {
        let sem = Arc::new(WeightSemaphore::new(10));
        sem.acquire(15);

        let acquired = Arc::new(AtomicBool::new(false));
        let waiter = {
            let sem = Arc::clone(&sem);
            let acquired = Arc::clone(&acquired);
            thread::spawn(move || {
                sem.acquire(5);
                acquired.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!acquired.load(Ordering::SeqCst));
        assert_eq!(sem.in_use(), 15);

        sem.release(15);
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));
        assert_eq!(sem.in_use(), 5);
    }

    #[test]
    fn concurrent_guards_never_exceed_capacity() {
        let sem = Arc::new(WeightSemaphore::new(12));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let sem = Arc::clone(&sem);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let _guard = sem.acquire_guard(1 + i % 4);
                        assert!(sem.in_use() <= 12);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(sem.in_use(), 0);
    }
}
