//! Shared health state for the /health endpoint.
//! Updated by the ListingRefresher.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use serde::Serialize;

/// Refresh-cycle health. Written by the refresher, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// True when the most recent refresh cycle completed.
    pub last_refresh_ok: AtomicBool,
    /// Nanosecond timestamp of the last attempted refresh (0 = none).
    pub last_attempt_at_ns: AtomicU64,
    /// Consecutive failed cycles; reset on success.
    pub consecutive_failures: AtomicU64,
}

#[derive(Debug, Serialize)]
pub struct HealthSnapshot {
    pub status: &'static str,
    pub last_refresh_ok: bool,
    pub last_attempt_at_ns: u64,
    pub consecutive_failures: u64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, at_ns: u64) {
        self.last_attempt_at_ns.store(at_ns, Ordering::Relaxed);
        self.last_refresh_ok.store(true, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
    }

    pub fn record_failure(&self, at_ns: u64) {
        self.last_attempt_at_ns.store(at_ns, Ordering::Relaxed);
        self.last_refresh_ok.store(false, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let ok = self.last_refresh_ok.load(Ordering::Relaxed);
        let attempted = self.last_attempt_at_ns.load(Ordering::Relaxed);
        let status = match (attempted, ok) {
            (0, _) => "starting",
            (_, true) => "ok",
            (_, false) => "degraded",
        };
        HealthSnapshot {
            status,
            last_refresh_ok: ok,
            last_attempt_at_ns: attempted,
            consecutive_failures: self.consecutive_failures.load(Ordering::Relaxed),
        }
    }
}
