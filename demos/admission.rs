//! Example bounding in-flight weight across producer threads.
//!
//! Each worker reserves the weight of the value it is about to build, hands
//! the value to a shared cache, then releases the reservation.
//!
//! Run with: cargo run --example admission

use std::sync::Arc;
use std::thread;

use bucketlru::admission::WeightSemaphore;
use bucketlru::builder::CacheBuilder;
use bucketlru::strategy::SizeAware;
use parking_lot::Mutex;

fn main() {
    let budget = Arc::new(WeightSemaphore::new(1 << 16));
    let cache = Arc::new(Mutex::new(
        CacheBuilder::new(1 << 20, 1 << 19)
            .strategy(SizeAware::new())
            .size_calculator(|v: &Vec<u8>| v.len())
            .build::<u64, Vec<u8>>(),
    ));

    let workers: Vec<_> = (0..4u64)
        .map(|worker| {
            let budget = Arc::clone(&budget);
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..64u64 {
                    let key = worker * 1_000 + i;
                    let size = 512 << (i % 6);
                    let reservation = budget.acquire_guard(size);
                    let value = vec![0u8; reservation.weight()];
                    cache.lock().insert(key, value);
                }
            })
        })
        .collect();

    for worker in workers {
        if worker.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    let cache = cache.lock();
    println!("=== Weight Admission ===\n");
    println!("   entries    = {}", cache.len());
    println!("   cache_size = {}", cache.cache_size());
    println!("   in flight  = {}", budget.in_use());
}
