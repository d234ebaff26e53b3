//! Pending Interest Table over a tagged bank
//!
//! Same shape as the FIB, with its own tag. By default it shares `bf1` with
//! the FIB and matches names exactly.

use super::{MatchPolicy, NameTable, TableBinding, TableKind};
use crate::domain::{BankHandle, BankUpdate, Name};

#[derive(Clone, Debug)]
pub struct NaivePit {
    binding: TableBinding,
}

impl NaivePit {
    pub const DEFAULT_BANK: &'static str = "bf1";
    pub const DEFAULT_TAG: &'static str = "PIT1";
    pub const DEFAULT_POLICY: MatchPolicy = MatchPolicy::Exact;

    pub fn new(bank: BankHandle) -> Self {
        Self::with_binding(TableBinding::new(bank, Self::DEFAULT_TAG, Self::DEFAULT_POLICY))
    }

    pub fn with_binding(binding: TableBinding) -> Self {
        Self { binding }
    }
}

impl NameTable for NaivePit {
    fn kind(&self) -> TableKind {
        TableKind::Pit
    }

    fn variant(&self) -> &'static str {
        "NaivePit"
    }

    fn binding(&self) -> &TableBinding {
        &self.binding
    }

    fn insert(&self, name: &Name) -> Vec<BankUpdate> {
        vec![self.binding.add(name)]
    }

    fn erase(&self, name: &Name) -> Vec<BankUpdate> {
        vec![self.binding.remove(name)]
    }

    fn find(&self, name: &Name) -> Option<Name> {
        self.binding.find(name)
    }
}
