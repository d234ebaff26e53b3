//! Content Store over a tagged bank
//!
//! Every structural prefix of a stored name is inserted, so an exact lookup
//! of a prefix answers "is there a stored object whose name equals or
//! extends this?".

use super::{MatchPolicy, NameTable, TableBinding, TableKind};
use crate::domain::{prefixes_of, BankHandle, BankUpdate, Name};

#[derive(Clone, Debug)]
pub struct NaiveCs {
    binding: TableBinding,
}

impl NaiveCs {
    pub const DEFAULT_BANK: &'static str = "bf2";
    pub const DEFAULT_TAG: &'static str = "CS2";
    pub const DEFAULT_POLICY: MatchPolicy = MatchPolicy::Exact;

    pub fn new(bank: BankHandle) -> Self {
        Self::with_binding(TableBinding::new(bank, Self::DEFAULT_TAG, Self::DEFAULT_POLICY))
    }

    pub fn with_binding(binding: TableBinding) -> Self {
        Self { binding }
    }
}

impl NameTable for NaiveCs {
    fn kind(&self) -> TableKind {
        TableKind::Cs
    }

    fn variant(&self) -> &'static str {
        "NaiveCs"
    }

    fn binding(&self) -> &TableBinding {
        &self.binding
    }

    fn insert(&self, name: &Name) -> Vec<BankUpdate> {
        prefixes_of(name)
            .iter()
            .map(|prefix| self.binding.add(prefix))
            .collect()
    }

    fn erase(&self, name: &Name) -> Vec<BankUpdate> {
        prefixes_of(name)
            .iter()
            .map(|prefix| self.binding.remove(prefix))
            .collect()
    }

    fn find(&self, name: &Name) -> Option<Name> {
        self.binding.find(name)
    }
}
