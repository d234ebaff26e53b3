//! Per-bank operation counters
//!
//! Every `BankHandle` carries one `BankMetrics`. Counters are atomics so a
//! snapshot can be taken through a shared handle at any time.
//!
//! ## Usage
//!
//! ```ignore
//! let bank = nic.bank("bf1")?;
//! bank.add(&name, "FIB1");
//! let snapshot = bank.metrics();
//! println!("{} adds, {} saturated counters", snapshot.adds, snapshot.saturations);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::{CounterUpdate, UpdateOp};

/// Metrics collector for one memory bank
#[derive(Debug, Default)]
pub struct BankMetrics {
    /// Add operations
    pub adds: AtomicU64,
    /// Remove operations that matched a present entry
    pub removes: AtomicU64,
    /// Remove operations that were dropped as unmatched
    pub unmatched_removes: AtomicU64,
    /// Query operations
    pub queries: AtomicU64,
    /// Queries that answered present (true or false positive)
    pub query_hits: AtomicU64,
    /// Counters that reached saturation
    pub saturations: AtomicU64,
}

impl BankMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of an add or remove
    pub fn record_update(&self, update: &CounterUpdate) {
        match (update.op, update.unmatched) {
            (UpdateOp::Add, _) => self.adds.fetch_add(1, Ordering::Relaxed),
            (UpdateOp::Remove, false) => self.removes.fetch_add(1, Ordering::Relaxed),
            (UpdateOp::Remove, true) => self.unmatched_removes.fetch_add(1, Ordering::Relaxed),
        };
        if !update.saturated.is_empty() {
            self.saturations
                .fetch_add(update.saturated.len() as u64, Ordering::Relaxed);
        }
    }

    /// Record a query
    pub fn record_query(&self, present: bool) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if present {
            self.query_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            adds: self.adds.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            unmatched_removes: self.unmatched_removes.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            query_hits: self.query_hits.load(Ordering::Relaxed),
            saturations: self.saturations.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.adds.store(0, Ordering::Relaxed);
        self.removes.store(0, Ordering::Relaxed);
        self.unmatched_removes.store(0, Ordering::Relaxed);
        self.queries.store(0, Ordering::Relaxed);
        self.query_hits.store(0, Ordering::Relaxed);
        self.saturations.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub adds: u64,
    pub removes: u64,
    pub unmatched_removes: u64,
    pub queries: u64,
    pub query_hits: u64,
    pub saturations: u64,
}

impl MetricsSnapshot {
    /// Share of queries that answered present.
    ///
    /// Includes true positives as well as false positives.
    pub fn observed_positive_rate(&self) -> f64 {
        if self.queries > 0 {
            self.query_hits as f64 / self.queries as f64
        } else {
            0.0
        }
    }
}
