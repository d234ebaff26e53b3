//! Table adapters
//!
//! FIB, PIT and CS are thin policies over a tagged memory bank. They turn
//! insert/erase/lookup of a name into one or more bank operations and hold
//! no state beyond their binding.

use std::fmt;
use std::str::FromStr;

use crate::domain::{prefixes_of, BankHandle, BankUpdate, Name};

pub mod cs;
pub mod fib;
pub mod pit;
pub mod registry;

pub use cs::NaiveCs;
pub use fib::NaiveFib;
pub use pit::NaivePit;
pub use registry::{TableFactory, TableRegistry};

/// The three logical tables of the NIC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableKind {
    Fib,
    Pit,
    Cs,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Fib, TableKind::Pit, TableKind::Cs];

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Fib => "FIB",
            TableKind::Pit => "PIT",
            TableKind::Cs => "CS",
        }
    }

    /// Configuration source label used in error messages.
    pub fn origin(&self) -> String {
        format!("table {}", self.label().to_ascii_lowercase())
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which prefixes a lookup tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatchPolicy {
    /// Only the name as given
    #[default]
    Exact,
    /// Every prefix, longest first, stopping at the first hit
    LongestPrefix,
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchPolicy::Exact),
            "longest-prefix" | "longest_prefix" | "lpm" => Ok(MatchPolicy::LongestPrefix),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::LongestPrefix => "longest-prefix",
        })
    }
}

/// A table's bank, tag and lookup policy.
#[derive(Clone, Debug)]
pub struct TableBinding {
    bank: BankHandle,
    tag: String,
    policy: MatchPolicy,
}

impl TableBinding {
    pub fn new(bank: BankHandle, tag: impl Into<String>, policy: MatchPolicy) -> Self {
        Self {
            bank,
            tag: tag.into(),
            policy,
        }
    }

    pub fn bank(&self) -> &BankHandle {
        &self.bank
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub(crate) fn add(&self, name: &Name) -> BankUpdate {
        self.bank.add(name, &self.tag)
    }

    pub(crate) fn remove(&self, name: &Name) -> BankUpdate {
        self.bank.remove(name, &self.tag)
    }

    pub(crate) fn find(&self, name: &Name) -> Option<Name> {
        match self.policy {
            MatchPolicy::Exact => self.bank.query(name, &self.tag).then(|| name.clone()),
            MatchPolicy::LongestPrefix => prefixes_of(name)
                .into_iter()
                .find(|prefix| self.bank.query(prefix, &self.tag)),
        }
    }
}

/// Table contract consumed by the simulation driver.
pub trait NameTable: Send + Sync + fmt::Debug {
    fn kind(&self) -> TableKind;

    /// Registry identifier of the implementation.
    fn variant(&self) -> &'static str;

    fn binding(&self) -> &TableBinding;

    fn insert(&self, name: &Name) -> Vec<BankUpdate>;

    fn erase(&self, name: &Name) -> Vec<BankUpdate>;

    /// The name or prefix that matched, per the binding's policy.
    fn find(&self, name: &Name) -> Option<Name>;

    fn lookup(&self, name: &Name) -> bool {
        self.find(name).is_some()
    }
}
