//! Outbound Ports (Driven Ports)
//!
//! The simulation driver keeps two line-oriented logs: NIC decisions and
//! Bloom-filter updates. The table layer reports into them through
//! `SimulationLog`.

use std::fmt;
use std::io;

use crate::domain::{BankUpdate, Name};
use crate::tables::TableKind;

/// Table-level operation requested by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableOp {
    Insert,
    Erase,
    Lookup,
}

impl fmt::Display for TableOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableOp::Insert => "insert",
            TableOp::Erase => "erase",
            TableOp::Lookup => "lookup",
        })
    }
}

/// Result of one table operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Lookup answered present; carries the name or prefix that matched
    Hit(Name),
    Miss,
    /// Insert or erase was applied to the bank
    Applied,
}

/// One line of the NIC decision log.
///
/// `FIB lookup /a/b/c HIT match=/a/b`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    pub table: TableKind,
    pub op: TableOp,
    pub name: Name,
    pub outcome: Outcome,
}

impl Decision {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, Outcome::Hit(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} ", self.table, self.op, self.name)?;
        match &self.outcome {
            Outcome::Hit(matched) => write!(f, "HIT match={}", matched),
            Outcome::Miss => f.write_str("MISS"),
            Outcome::Applied => f.write_str("APPLIED"),
        }
    }
}

/// Sink for the decision and update logs (Driven Port)
pub trait SimulationLog {
    fn record_decision(&mut self, decision: &Decision) -> io::Result<()>;

    fn record_update(&mut self, update: &BankUpdate) -> io::Result<()>;
}
