//! # NIC Name Tables
//!
//! Counting-Bloom-filter backed FIB, PIT and CS tables for a simulated
//! named-data NIC.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O beyond loading
//!   polynomial files
//!   - `CountingBloomFilter`: tagged counting filter over a `HashGroup`
//!   - `HmacHash` / `XorHash`: keyed hash functions reduced mod m
//!   - `BankSpec`, `NicConfig`: configuration grammar with validation
//!   - `Nic`: owns the memory banks and hands out `BankHandle`s
//!
//! - **Tables** (`tables/`): `NameTable` adapters and the registry that
//!   resolves table expressions such as `NaivePit(bank=bf3)`
//!
//! - **Ports Layer** (`ports/`): `SimulationLog`, the driven port for the
//!   decision and update logs
//!
//! - **Service Layer** (`service/`): `NicTables` wires configuration, banks
//!   and tables, and applies driver operations
//!
//! - **Adapters Layer** (`adapters/`): `LineLog` and `MemoryLog`
//!
//! ## Invariants
//!
//! - No false negatives: a name inserted under a tag and not erased is
//!   always found under that tag
//! - Counters never underflow; a saturated counter stays saturated
//! - An erase of a name that is not present changes no counter
//!
//! ## Usage Example
//!
//! ```
//! use nicsim_tables::{MemoryLog, Name, NicConfigBuilder, NicTables, TableKind};
//!
//! let config = NicConfigBuilder::new().seed(7).build()?;
//! let tables = NicTables::from_config(&config)?;
//! let mut log = MemoryLog::new();
//!
//! tables.insert(TableKind::Fib, &Name::parse("/video"), &mut log)?;
//! assert!(tables.lookup(TableKind::Fib, &Name::parse("/video/hd/1"), &mut log)?);
//! # Ok::<(), nicsim_tables::NicError>(())
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;
pub mod tables;

// Re-exports for convenience
pub use adapters::{LineLog, MemoryLog};
pub use domain::{
    BankHandle, BankSpec, BankUpdate, CountingBloomFilter, HashGroup, HashSpec, HmacAlgorithm,
    HmacHash, Name, Nic, NicConfig, NicConfigBuilder, XorHash,
};
pub use error::{ConfigError, NicError};
pub use metrics::{BankMetrics, MetricsSnapshot};
pub use ports::{Decision, Outcome, SimulationLog, TableOp};
pub use service::NicTables;
pub use tables::{MatchPolicy, NameTable, TableKind, TableRegistry};
