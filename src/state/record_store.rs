use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::types::{EnrichedRecord, SocialMetrics};

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Latest refresh cycle, held in memory only.
///
/// The ordered snapshot is swapped atomically behind an `Arc`, so readers keep
/// a consistent view for the whole request while the refresher publishes the
/// next cycle. Per-symbol lookups go through the dashmaps.
pub struct RecordStore {
    /// Enriched records in provider (rank) order.
    snapshot: RwLock<Arc<Vec<EnrichedRecord>>>,
    /// lowercased symbol → record. First (best-ranked) record wins on symbol clashes.
    by_symbol: DashMap<String, EnrichedRecord>,
    /// lowercased symbol → community data from the last cycle
    social: DashMap<String, SocialMetrics>,
    /// Nanosecond UTC epoch of the last successful publish (0 = never).
    refreshed_at_ns: AtomicU64,
}

impl RecordStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the current cycle with a freshly enriched one.
    pub fn publish(&self, records: Vec<EnrichedRecord>, social: HashMap<String, SocialMetrics>, at_ns: u64) {
        let mut fresh: HashMap<String, EnrichedRecord> = HashMap::with_capacity(records.len());
        for r in &records {
            fresh.entry(r.raw.symbol.to_lowercase()).or_insert_with(|| r.clone());
        }

        // Overwrite first, then drop keys that left the listing, so lookups never
        // see an empty map mid-publish.
        for (symbol, record) in fresh.iter() {
            self.by_symbol.insert(symbol.clone(), record.clone());
        }
        self.by_symbol.retain(|k, _| fresh.contains_key(k));

        for (symbol, metrics) in social.iter() {
            self.social.insert(symbol.clone(), metrics.clone());
        }
        self.social.retain(|k, _| social.contains_key(k));

        match self.snapshot.write() {
            Ok(mut guard) => *guard = Arc::new(records),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(records),
        }
        self.refreshed_at_ns.store(at_ns, Ordering::Relaxed);
    }

    /// Cheap clone of the current ordered snapshot.
    pub fn snapshot(&self) -> Arc<Vec<EnrichedRecord>> {
        match self.snapshot.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Option<EnrichedRecord> {
        self.by_symbol.get(&symbol.to_lowercase()).map(|r| r.clone())
    }

    pub fn social_for(&self, symbol: &str) -> Option<SocialMetrics> {
        self.social.get(&symbol.to_lowercase()).map(|m| m.clone())
    }

    pub fn record_count(&self) -> usize {
        self.snapshot().len()
    }

    pub fn social_count(&self) -> usize {
        self.social.len()
    }

    pub fn refreshed_at_ns(&self) -> u64 {
        self.refreshed_at_ns.load(Ordering::Relaxed)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Vec::new())),
            by_symbol: DashMap::new(),
            social: DashMap::new(),
            refreshed_at_ns: AtomicU64::new(0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
