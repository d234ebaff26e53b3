//! # Counting Bloom Filter
//!
//! One physical memory bank of the simulated NIC.
//!
//! Bits are replaced with counters:
//! - Add: increment the counter at every hashed position
//! - Remove: decrement the counter at every hashed position
//! - Membership: true if all counters > 0
//!
//! Every operation takes a tag that is folded into the hash input, so
//! several logical tables can share one counter array. A remove only
//! undoes counters reached through the same `(name, tag)`.
//!
//! ## Counter policy
//!
//! - Counters are `u16`. A counter that reaches `MAX_COUNTER` is sticky:
//!   later adds and removes leave it alone, so saturation can never produce
//!   a false negative. The operation that saturates a counter reports it.
//! - A remove whose `(name, tag)` is not currently present is a no-op and is
//!   flagged `unmatched`. Otherwise each decrement clamps at zero, which only
//!   matters when two hash functions collide on the same counter.

use std::fmt;

use tracing::warn;

use super::hash_functions::HashGroup;
use super::parameters::calculate_fpr;

/// Counter cell type.
pub type Counter = u16;

/// Saturation value of a counter.
pub const MAX_COUNTER: Counter = Counter::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateOp {
    Add,
    Remove,
}

impl fmt::Display for UpdateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateOp::Add => "add",
            UpdateOp::Remove => "remove",
        })
    }
}

/// One step applied to one counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterChange {
    pub index: usize,
    pub before: Counter,
    pub after: Counter,
}

/// What an add or remove did to the counter array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CounterUpdate {
    pub op: UpdateOp,
    /// One entry per produced index, in hash-group order.
    pub changes: Vec<CounterChange>,
    /// Counters that reached `MAX_COUNTER` during this operation.
    pub saturated: Vec<usize>,
    /// Remove of a `(name, tag)` that was not present.
    pub unmatched: bool,
}

impl CounterUpdate {
    fn new(op: UpdateOp) -> Self {
        Self {
            op,
            changes: Vec::new(),
            saturated: Vec::new(),
            unmatched: false,
        }
    }

    /// True when no counter value changed.
    pub fn is_noop(&self) -> bool {
        self.changes.iter().all(|c| c.before == c.after)
    }
}

/// Counting Bloom filter with tagged operations.
#[derive(Clone, Debug)]
pub struct CountingBloomFilter {
    counters: Vec<Counter>,
    hashes: HashGroup,
    /// Adds minus matched removes
    entries: usize,
}

impl CountingBloomFilter {
    /// Create a filter with one counter per bucket of the hash group.
    pub fn new(hashes: HashGroup) -> Self {
        Self {
            counters: vec![0; hashes.modulus()],
            hashes,
            entries: 0,
        }
    }

    /// Bucket indices for `(name, tag)`, duplicates included.
    pub fn indices(&self, name: &[u8], tag: &str) -> Vec<usize> {
        self.hashes.evaluate(name, tag)
    }

    /// Add an element (increment counters).
    ///
    /// Afterwards `query(name, tag)` is guaranteed to be true.
    pub fn add(&mut self, name: &[u8], tag: &str) -> CounterUpdate {
        let mut update = CounterUpdate::new(UpdateOp::Add);
        for index in self.indices(name, tag) {
            let before = self.counters[index];
            let after = if before == MAX_COUNTER { before } else { before + 1 };
            self.counters[index] = after;
            if after == MAX_COUNTER && before != MAX_COUNTER {
                warn!(index, tag, "counter saturated; it will no longer be decremented");
                update.saturated.push(index);
            }
            update.changes.push(CounterChange { index, before, after });
        }
        self.entries += 1;
        update
    }

    /// Remove an element (decrement counters).
    ///
    /// A `(name, tag)` that does not query as present is left alone. One
    /// that only queries as present through a false positive is removed like
    /// a real entry and lowers `entries`, so `expected_fpr` then runs low.
    pub fn remove(&mut self, name: &[u8], tag: &str) -> CounterUpdate {
        let mut update = CounterUpdate::new(UpdateOp::Remove);
        let indices = self.indices(name, tag);
        if !self.all_nonzero(&indices) {
            update.unmatched = true;
            return update;
        }

        for index in indices {
            let before = self.counters[index];
            let after = match before {
                0 | MAX_COUNTER => before,
                _ => before - 1,
            };
            self.counters[index] = after;
            update.changes.push(CounterChange { index, before, after });
        }
        self.entries = self.entries.saturating_sub(1);
        update
    }

    /// Check if `(name, tag)` might be in the filter.
    pub fn query(&self, name: &[u8], tag: &str) -> bool {
        self.all_nonzero(&self.indices(name, tag))
    }

    fn all_nonzero(&self, indices: &[usize]) -> bool {
        indices.iter().all(|&i| self.counters[i] > 0)
    }

    /// Get counter at position.
    pub fn counter(&self, index: usize) -> Counter {
        self.counters[index]
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    /// Number of counters (m).
    pub fn size(&self) -> usize {
        self.counters.len()
    }

    /// Number of hash functions (k).
    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    pub fn hash_group(&self) -> &HashGroup {
        &self.hashes
    }

    /// Net number of stored `(name, tag)` entries.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn nonzero_count(&self) -> usize {
        self.counters.iter().filter(|&&c| c > 0).count()
    }

    /// Expected false positive rate for the current entry count.
    ///
    /// Formula: FPR = (1 - e^(-kn/m))^k
    pub fn expected_fpr(&self) -> f64 {
        calculate_fpr(self.size(), self.entries, self.hash_count())
    }

    /// Clear all counters.
    pub fn clear(&mut self) {
        self.counters.fill(0);
        self.entries = 0;
    }

    #[cfg(test)]
    pub(crate) fn set_counter(&mut self, index: usize, value: Counter) {
        self.counters[index] = value;
    }
}
