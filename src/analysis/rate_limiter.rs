// ABOUTME: Process-wide throttle enforcing a minimum interval between outbound AI calls
// ABOUTME: Waiters queue on a fair async mutex and suspend until their slot opens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use crate::constants::analysis::MIN_CALL_INTERVAL_SECS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Minimum-interval gate shared by every analysis call in the process
///
/// `acquire` holds the mutex while sleeping, so callers are admitted one at a time
/// in arrival order. The slot is stamped only after the wait completes; a caller
/// dropped mid-wait leaves the previous stamp in place.
#[derive(Debug, Clone)]
pub struct AnalysisRateLimiter {
    min_interval: Duration,
    last_call: Arc<Mutex<Option<Instant>>>,
}

impl AnalysisRateLimiter {
    /// Create a limiter with a custom interval
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Arc::new(Mutex::new(None)),
        }
    }

    /// Wait until the interval since the previous call has elapsed, then claim the slot
    ///
    /// Returns how long the caller was suspended.
    pub async fn acquire(&self) -> Duration {
        self.acquire_unless(|| false).await.unwrap_or_default()
    }

    /// Like [`acquire`](Self::acquire), but re-evaluates `skip` once the wait is over
    ///
    /// When `skip` returns true the slot is left unclaimed and `None` is returned, so
    /// the next caller is not delayed by a call that never happened.
    pub async fn acquire_unless<F>(&self, skip: F) -> Option<Duration>
    where
        F: FnOnce() -> bool,
    {
        let started = Instant::now();
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                debug!(
                    wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                    "Waiting for analysis rate limit slot"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        if skip() {
            return None;
        }

        *last_call = Some(Instant::now());
        Some(started.elapsed())
    }
}

impl Default for AnalysisRateLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(MIN_CALL_INTERVAL_SECS))
    }
}
