//! The simulated NIC and its memory banks
//!
//! The `Nic` is the only place counting Bloom filters are created. Tables
//! receive `BankHandle`s, so every write to a counter array can be traced
//! back to the bank that owns it. Each bank is one mutual-exclusion domain:
//! one writer or many readers at a time.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use super::config::NicConfig;
use super::counting_bloom::{CounterUpdate, CountingBloomFilter};
use super::name::Name;
use crate::error::{ConfigError, NicError};
use crate::metrics::{BankMetrics, MetricsSnapshot};

/// Shared handle to one memory bank.
#[derive(Clone)]
pub struct BankHandle {
    name: Arc<str>,
    filter: Arc<RwLock<CountingBloomFilter>>,
    metrics: Arc<BankMetrics>,
}

impl BankHandle {
    fn new(name: &str, filter: CountingBloomFilter) -> Self {
        Self {
            name: Arc::from(name),
            filter: Arc::new(RwLock::new(filter)),
            metrics: Arc::new(BankMetrics::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(&self, name: &Name, tag: &str) -> BankUpdate {
        let update = self.filter.write().add(&name.wire_bytes(), tag);
        self.finish(name, tag, update)
    }

    pub fn remove(&self, name: &Name, tag: &str) -> BankUpdate {
        let update = self.filter.write().remove(&name.wire_bytes(), tag);
        self.finish(name, tag, update)
    }

    pub fn query(&self, name: &Name, tag: &str) -> bool {
        let present = self.filter.read().query(&name.wire_bytes(), tag);
        self.metrics.record_query(present);
        present
    }

    fn finish(&self, name: &Name, tag: &str, update: CounterUpdate) -> BankUpdate {
        self.metrics.record_update(&update);
        let update = BankUpdate {
            bank: self.name.clone(),
            tag: tag.to_string(),
            name: name.clone(),
            update,
        };
        debug!(update = %update, "bank update");
        update
    }

    /// Run `f` against the filter under the read lock.
    pub fn read<T>(&self, f: impl FnOnce(&CountingBloomFilter) -> T) -> T {
        let guard = self.filter.read();
        f(&*guard)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Whether both handles point at the same counter array.
    pub fn same_bank(&self, other: &BankHandle) -> bool {
        Arc::ptr_eq(&self.filter, &other.filter)
    }
}

impl fmt::Debug for BankHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = self.filter.read();
        f.debug_struct("BankHandle")
            .field("name", &self.name)
            .field("size", &filter.size())
            .field("hash_count", &filter.hash_count())
            .finish()
    }
}

/// A counter update attributed to a bank, tag and name.
///
/// Displays as one line of the bloom-filter update log:
/// `bf1 add FIB1 /a/b 12:0->1 40:2->3`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankUpdate {
    pub bank: Arc<str>,
    pub tag: String,
    pub name: Name,
    pub update: CounterUpdate,
}

impl fmt::Display for BankUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.bank, self.update.op, self.tag, self.name)?;
        for change in &self.update.changes {
            write!(f, " {}:{}->{}", change.index, change.before, change.after)?;
        }
        if !self.update.saturated.is_empty() {
            let indices: Vec<String> = self.update.saturated.iter().map(usize::to_string).collect();
            write!(f, " saturated={}", indices.join(","))?;
        }
        if self.update.unmatched {
            f.write_str(" unmatched")?;
        }
        Ok(())
    }
}

/// The simulated NIC: a fixed set of named memory banks.
#[derive(Debug)]
pub struct Nic {
    banks: Vec<BankHandle>,
}

impl Nic {
    pub fn builder() -> NicBuilder {
        NicBuilder::default()
    }

    /// Build every bank in `config`. A configured seed makes keys and
    /// random polynomial terms reproducible.
    pub fn from_config(config: &NicConfig) -> Result<Self, NicError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut builder = Nic::builder();
        for (name, spec) in &config.banks {
            let filter = spec
                .build(&mut rng)
                .map_err(|e| NicError::at(format!("bank {}", name), e))?;
            info!(bank = %name, spec = %spec, "memory bank ready");
            builder = builder.bank(name.clone(), filter);
        }
        builder.build().map_err(|e| NicError::at("banks", e))
    }

    /// Handle to the bank called `name`.
    pub fn bank(&self, name: &str) -> Result<BankHandle, ConfigError> {
        self.banks
            .iter()
            .find(|bank| bank.name() == name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownBank {
                bank: name.to_string(),
            })
    }

    pub fn banks(&self) -> impl Iterator<Item = &BankHandle> {
        self.banks.iter()
    }

    pub fn bank_names(&self) -> Vec<&str> {
        self.banks.iter().map(BankHandle::name).collect()
    }
}

/// Assembles a `Nic` from already-built filters.
#[derive(Default)]
pub struct NicBuilder {
    banks: Vec<(String, CountingBloomFilter)>,
}

impl NicBuilder {
    pub fn bank(mut self, name: impl Into<String>, filter: CountingBloomFilter) -> Self {
        self.banks.push((name.into(), filter));
        self
    }

    pub fn build(self) -> Result<Nic, ConfigError> {
        if self.banks.is_empty() {
            return Err(ConfigError::InvalidSpec {
                input: String::new(),
                reason: "a NIC needs at least one memory bank".to_string(),
            });
        }

        let mut banks: Vec<BankHandle> = Vec::with_capacity(self.banks.len());
        for (name, filter) in self.banks {
            if banks.iter().any(|b| b.name() == name) {
                return Err(ConfigError::InvalidSpec {
                    input: name,
                    reason: "duplicate bank name".to_string(),
                });
            }
            banks.push(BankHandle::new(&name, filter));
        }
        Ok(Nic { banks })
    }
}
