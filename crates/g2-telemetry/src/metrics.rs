// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-call metrics for binding components.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// CallRecord
// ---------------------------------------------------------------------------

/// Outcome of a single native call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallRecord {
    /// Binding method name, e.g. `AddConfig`.
    pub method: String,
    /// Wall-clock duration in microseconds.
    pub duration_us: u64,
    /// Whether the native call returned a non-zero code.
    pub failed: bool,
    /// Error categories of the failure, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

// ---------------------------------------------------------------------------
// CallSummary
// ---------------------------------------------------------------------------

/// Aggregated statistics across recorded calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CallSummary {
    /// Number of calls in the window.
    pub count: usize,
    /// Mean duration in microseconds.
    pub mean_duration_us: f64,
    /// Median (p50) duration in microseconds.
    pub p50_duration_us: f64,
    /// 99th-percentile duration in microseconds.
    pub p99_duration_us: f64,
    /// Failed calls / total calls.
    pub error_rate: f64,
    /// Calls per method.
    pub method_counts: BTreeMap<String, usize>,
    /// Failures per error category.
    pub category_counts: BTreeMap<String, usize>,
}

/// Compute a percentile value from a **sorted** slice.
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0] as f64;
    }
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac
}

// ---------------------------------------------------------------------------
// CallCollector
// ---------------------------------------------------------------------------

/// Records kept by [`CallCollector::new`].
pub const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug)]
struct Window {
    records: VecDeque<CallRecord>,
    capacity: usize,
    total: u64,
}

/// Thread-safe collector of the most recent [`CallRecord`]s. Cloning shares
/// the storage.
///
/// Once `capacity` records are held, each new record evicts the oldest.
/// Summaries cover the retained window only.
#[derive(Debug, Clone)]
pub struct CallCollector {
    inner: Arc<Mutex<Window>>,
}

impl Default for CallCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl CallCollector {
    /// A collector keeping the last [`DEFAULT_CAPACITY`] calls.
    pub fn new() -> Self {
        Self::bounded(DEFAULT_CAPACITY)
    }

    /// A collector keeping the last `capacity` calls (at least one).
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Window {
                records: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY)),
                capacity,
                total: 0,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Window> {
        self.inner.lock().expect("metrics lock poisoned")
    }

    /// Record a completed call, evicting the oldest record when full.
    pub fn record(&self, record: CallRecord) {
        let mut w = self.lock();
        if w.records.len() == w.capacity {
            w.records.pop_front();
        }
        w.records.push_back(record);
        w.total += 1;
    }

    /// Retained calls, oldest first.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.lock().records.iter().cloned().collect()
    }

    /// Number of retained calls.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Whether no call is retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of retained calls.
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Calls recorded since creation or the last [`CallCollector::clear`],
    /// evicted ones included.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    /// Aggregate the retained window.
    pub fn summary(&self) -> CallSummary {
        let w = self.lock();
        let data = &w.records;
        if data.is_empty() {
            return CallSummary::default();
        }

        let count = data.len();
        let mut durations: Vec<u64> = data.iter().map(|r| r.duration_us).collect();
        durations.sort_unstable();
        let total: u64 = durations.iter().sum();

        let failures = data.iter().filter(|r| r.failed).count();

        let mut method_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut category_counts: BTreeMap<String, usize> = BTreeMap::new();
        for r in data.iter() {
            *method_counts.entry(r.method.clone()).or_insert(0) += 1;
            for c in &r.categories {
                *category_counts.entry(c.clone()).or_insert(0) += 1;
            }
        }

        CallSummary {
            count,
            mean_duration_us: total as f64 / count as f64,
            p50_duration_us: percentile(&durations, 50.0),
            p99_duration_us: percentile(&durations, 99.0),
            error_rate: failures as f64 / count as f64,
            method_counts,
            category_counts,
        }
    }

    /// Drop all retained calls and reset the total.
    pub fn clear(&self) {
        let mut w = self.lock();
        w.records.clear();
        w.total = 0;
    }
}
