//! Refresh-cycle latency histogram: fetch listings, fetch community data,
//! enrich, publish. Exposed at /stats/latency.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

/// Shared cycle timings. Refresher records, API reads. Values in milliseconds.
pub struct RefreshLatency {
    inner: Mutex<hdrhistogram::Histogram<u64>>,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub samples: u64,
    pub p50_ms: Option<u64>,
    pub p95_ms: Option<u64>,
    pub max_ms: Option<u64>,
}

impl RefreshLatency {
    /// Tracks 1ms to 1h at 2 significant figures; a cycle includes throttled
    /// community requests so tens of seconds are normal.
    pub fn new() -> Self {
        let histogram = hdrhistogram::Histogram::new_with_bounds(1, 3_600_000, 2)
            .expect("valid histogram bounds");
        Self {
            inner: Mutex::new(histogram),
        }
    }

    pub fn record(&self, d: Duration) {
        let ms = d.as_millis().clamp(1, 3_600_000) as u64;
        if let Ok(mut h) = self.inner.lock() {
            let _ = h.record(ms);
        }
    }

    pub fn summary(&self) -> LatencySummary {
        let Ok(h) = self.inner.lock() else {
            return LatencySummary::default();
        };
        if h.len() == 0 {
            return LatencySummary::default();
        }
        LatencySummary {
            samples: h.len(),
            p50_ms: Some(h.value_at_quantile(0.5)),
            p95_ms: Some(h.value_at_quantile(0.95)),
            max_ms: Some(h.max()),
        }
    }
}

impl Default for RefreshLatency {
    fn default() -> Self {
        Self::new()
    }
}
