//! Ports Layer
//!
//! Driven ports the table layer reports through. The trace reader that
//! drives the tables lives outside this crate.

pub mod outbound;

pub use outbound::{Decision, Outcome, SimulationLog, TableOp};
