//! Stress tests for NSKV.
//!
//! These helpers drive a store under heavy concurrent access and report
//! throughput and failures.

use nskv_core::{Namespace, Store};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }

    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Total operations: {}", self.total_ops);
        println!("Successful: {}", self.successful_ops);
        println!("Failed: {}", self.failed_ops);
        println!("Duration: {:?}", self.duration);
        println!("Throughput: {:.2} ops/sec", self.ops_per_second);
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
    /// Number of distinct set keys the threads spread over.
    pub keys: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 200,
            threads: 8,
            keys: 1,
        }
    }
}

/// Concurrently adds distinct elements to sets in `ns`.
///
/// Thread `t` adds `t * operations + i` for `i in 0..operations` to set key
/// `i % keys`, so no two threads ever add the same element. With no lost
/// updates every set ends up holding every element routed to it.
pub fn stress_concurrent_set_adds(ns: &Namespace, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let keys = config.keys.max(1) as i64;
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let (successful, failed) = (&successful, &failed);
            scope.spawn(move || {
                for i in 0..config.operations {
                    let element = (t * config.operations + i) as i64;
                    match ns.add_to_set(element % keys, element) {
                        Ok(true) => successful.fetch_add(1, Ordering::Relaxed),
                        Ok(false) | Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}

/// Counts the elements across the sets written by [`stress_concurrent_set_adds`].
pub fn count_set_elements(ns: &Namespace, config: &StressConfig) -> usize {
    (0..config.keys.max(1) as i64)
        .map(|key| ns.get_set(key).map(|set| set.len()).unwrap_or(0))
        .sum()
}

/// Concurrently registers the same prefix from many threads.
///
/// Returns the number of threads whose registration succeeded.
pub fn race_namespace_registration(store: &Store, id: i64, threads: usize) -> usize {
    let winners = AtomicUsize::new(0);
    thread::scope(|scope| {
        for _ in 0..threads {
            let winners = &winners;
            scope.spawn(move || {
                if store.namespace(id).is_ok() {
                    winners.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });
    winners.into_inner()
}

/// Runs a mixed put/get workload from many threads, each in its own key range.
pub fn stress_mixed_operations(ns: &Namespace, config: &StressConfig) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let start = Instant::now();

    thread::scope(|scope| {
        for t in 0..config.threads {
            let (successful, failed) = (&successful, &failed);
            scope.spawn(move || {
                for i in 0..config.operations {
                    let key = (t * config.operations + i) as i64;
                    let ok = if i % 2 == 0 {
                        ns.put(key, &key).is_ok()
                    } else {
                        ns.get::<i64, _>(key - 1)
                            .map(|v| v == Some(key - 1))
                            .unwrap_or(false)
                    };
                    if ok {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    )
}
