//! Example comparing the three bucket strategies on the same workload.
//!
//! Run with: cargo run --example basic_size_aware

use bucketlru::builder::CacheBuilder;
use bucketlru::cache::BucketCache;
use bucketlru::strategy::{Plain, SizeAndPopularityAware, SizeAware, Strategy};

type Blob = Vec<u8>;

fn blob_len(blob: &Blob) -> usize {
    blob.len()
}

fn new_cache<S: Strategy>(strategy: S) -> BucketCache<&'static str, Blob, S, fn(&Blob) -> usize> {
    CacheBuilder::new(4096, 2048)
        .strategy(strategy)
        .size_calculator(blob_len as fn(&Blob) -> usize)
        .build()
}

fn run<S: Strategy>(label: &str, strategy: S) {
    let mut cache = new_cache(strategy);

    cache.insert("thumbnail", vec![0; 64]);
    cache.insert("avatar", vec![0; 128]);
    cache.insert("video", vec![0; 2048]);
    cache.insert("config", vec![0; 16]);

    // The video is requested often; everything else once.
    for _ in 0..8 {
        cache.fetch(&"video");
    }

    // 2256 + 2000 > 4096: the cache drains to 2048 - 2000 = 48 first.
    cache.insert("report", vec![0; 2000]);

    println!("{label}");
    for key in ["thumbnail", "avatar", "video", "config", "report"] {
        match cache.bucket_of(&key) {
            Some(bucket) => println!("   {key:<10} resident in bucket {bucket}"),
            None => println!("   {key:<10} evicted"),
        }
    }
    println!("   cache_size = {} across {} entries", cache.cache_size(), cache.len());
    println!();
}

fn main() {
    println!("=== Bucket Strategies ===\n");
    run("1. Plain (one LRU list)", Plain);
    run("2. SizeAware (bucket = log2 weight)", SizeAware::new());
    run(
        "3. SizeAndPopularityAware (bucket = log2 weight - log2 hits)",
        SizeAndPopularityAware::new(),
    );
}
