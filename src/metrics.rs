//! Request counters and a sliding window of search latencies for `/metrics`.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

/// Number of most recent search latencies kept for percentile reporting.
pub const LATENCY_WINDOW: usize = 1024;

/// Average and percentiles over the latency window, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub avg_us: f64,
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
}

/// Counters for a served label store.
///
/// Totals cover the whole process lifetime; latencies only the last
/// `capacity` searches.
#[derive(Debug)]
pub struct MetricsCollector {
    latencies_us: VecDeque<f64>,
    capacity: usize,
    searches: u64,
    inserts: u64,
    rejected: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::with_window(LATENCY_WINDOW)
    }

    /// Keep at most `capacity` latency samples (at least one).
    pub fn with_window(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            latencies_us: VecDeque::with_capacity(capacity),
            capacity,
            searches: 0,
            inserts: 0,
            rejected: 0,
        }
    }

    pub fn record_search(&mut self, elapsed: Duration) {
        self.searches += 1;
        if self.latencies_us.len() == self.capacity {
            self.latencies_us.pop_front();
        }
        self.latencies_us.push_back(elapsed.as_secs_f64() * 1e6);
    }

    pub fn record_inserts(&mut self, count: usize) {
        self.inserts += count as u64;
    }

    /// A request the store refused: bad dimension, bad batch.
    pub fn record_rejected(&mut self) {
        self.rejected += 1;
    }

    pub fn searches(&self) -> u64 {
        self.searches
    }

    pub fn inserts(&self) -> u64 {
        self.inserts
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Latency samples currently held.
    pub fn window_len(&self) -> usize {
        self.latencies_us.len()
    }

    /// Summarize the window from a single sorted copy.
    pub fn latency_summary(&self) -> LatencySummary {
        if self.latencies_us.is_empty() {
            return LatencySummary::default();
        }

        let mut sorted: Vec<f64> = self.latencies_us.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);
        let last = sorted.len() - 1;
        let at = |pct: f64| sorted[((pct / 100.0) * last as f64).round() as usize];

        LatencySummary {
            samples: sorted.len(),
            avg_us: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50_us: at(50.0),
            p95_us: at(95.0),
            p99_us: at(99.0),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
