use rand::Rng;
use rotating_cuckoo_rs::{FilterConfig, FilterConfigBuilder, ManualClock};
use std::sync::Arc;

/// Consistent, distinct test items
#[allow(dead_code)]
pub fn generate_test_items(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| format!("{prefix}_{i:06}").into_bytes())
        .collect()
}

/// Random 16-byte items, disjoint from `generate_test_items` output
#[allow(dead_code)]
pub fn generate_random_items(count: usize) -> Vec<Vec<u8>> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| (0..16).map(|_| rng.random::<u8>()).collect())
        .collect()
}

/// Config whose clock never moves, so every new table keeps the size of the
/// previous one
#[allow(dead_code)]
pub fn frozen_clock_config(initial_size_k: usize) -> FilterConfig {
    FilterConfigBuilder::default()
        .initial_size_k(initial_size_k)
        .clock(Arc::new(ManualClock::new(0)))
        .build()
        .expect("Failed to build test config")
}
