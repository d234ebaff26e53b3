//! Domain Layer - the probabilistic table engine
//!
//! This layer contains:
//! - Names and prefix decomposition
//! - Hash functions (HMAC, XOR-polynomial) and hash groups
//! - Counting Bloom filter with tagged operations
//! - Parameter calculations
//! - Bank specs and NIC configuration
//! - The NIC and its memory banks
//!
//! RULES:
//! - No I/O except polynomial files, read once at construction
//! - No async code

pub mod config;
pub mod counting_bloom;
pub mod hash_functions;
pub mod name;
pub mod nic;
pub mod parameters;
pub mod xor_hash;

pub use config::{BankSpec, HashSpec, NicConfig, NicConfigBuilder, TableExpr};
pub use counting_bloom::{
    Counter, CounterChange, CounterUpdate, CountingBloomFilter, UpdateOp, MAX_COUNTER,
};
pub use hash_functions::{canonical_input, HashFunction, HashGroup, HmacAlgorithm, HmacHash};
pub use name::{prefixes_of, Name};
pub use nic::{BankHandle, BankUpdate, Nic, NicBuilder};
pub use parameters::{calculate_fpr, calculate_optimal_parameters, BloomFilterParams};
pub use xor_hash::{PolynomialFile, XorHash, XOR_TERMS_PER_HASH};
