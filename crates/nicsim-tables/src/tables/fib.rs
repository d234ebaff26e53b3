//! Forwarding Information Base over a tagged bank
//!
//! FIB entries are already full prefixes, so insert and erase touch exactly
//! the name given. Lookups default to longest-prefix match.

use super::{MatchPolicy, NameTable, TableBinding, TableKind};
use crate::domain::{BankHandle, BankUpdate, Name};

#[derive(Clone, Debug)]
pub struct NaiveFib {
    binding: TableBinding,
}

impl NaiveFib {
    pub const DEFAULT_BANK: &'static str = "bf1";
    pub const DEFAULT_TAG: &'static str = "FIB1";
    pub const DEFAULT_POLICY: MatchPolicy = MatchPolicy::LongestPrefix;

    pub fn new(bank: BankHandle) -> Self {
        Self::with_binding(TableBinding::new(bank, Self::DEFAULT_TAG, Self::DEFAULT_POLICY))
    }

    pub fn with_binding(binding: TableBinding) -> Self {
        Self { binding }
    }
}

impl NameTable for NaiveFib {
    fn kind(&self) -> TableKind {
        TableKind::Fib
    }

    fn variant(&self) -> &'static str {
        "NaiveFib"
    }

    fn binding(&self) -> &TableBinding {
        &self.binding
    }

    fn insert(&self, prefix: &Name) -> Vec<BankUpdate> {
        vec![self.binding.add(prefix)]
    }

    fn erase(&self, prefix: &Name) -> Vec<BankUpdate> {
        vec![self.binding.remove(prefix)]
    }

    fn find(&self, name: &Name) -> Option<Name> {
        self.binding.find(name)
    }
}
