//! Adapters Layer (Driven Adapters)
//!
//! Implementations of `SimulationLog`:
//!
//! - `LineLog` - decision and update lines to one or two writers
//! - `MemoryLog` - rendered lines kept in memory

pub mod line_log;

pub use line_log::{LineLog, MemoryLog};
