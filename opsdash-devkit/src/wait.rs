//! Polling helpers for async test assertions.

use std::time::{Duration, Instant};

/// Polls `cond` every 25 ms until it holds or `timeout_ms` elapses.
/// Returns whether the condition was observed.
pub async fn wait_for<F: Fn() -> bool>(cond: F, timeout_ms: u64) -> bool {
    let start = Instant::now();
    while start.elapsed() < Duration::from_millis(timeout_ms) {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    false
}
