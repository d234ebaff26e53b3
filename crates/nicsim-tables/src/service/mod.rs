//! Service Layer
//!
//! Builds the NIC and its tables from configuration and applies driver
//! operations, reporting through the outbound log port.

pub mod nic_tables;

pub use nic_tables::NicTables;
