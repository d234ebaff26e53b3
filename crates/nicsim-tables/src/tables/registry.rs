//! # Table Registry
//!
//! Maps table identifiers to constructors. The set of variants is closed:
//! anything not registered here is rejected at startup, and expressions can
//! only choose a variant and set its `bank`, `tag` and `match` arguments.
//!
//! ```text
//! NaiveFib                          -> bf1, tag FIB1, longest-prefix
//! NaivePit(bank=bf3)                -> bf3, tag PIT1, exact
//! Cs(nic, tag="CS9", match=lpm)     -> bf2, tag CS9, longest-prefix
//! ```

use std::collections::BTreeMap;

use tracing::info;

use super::{MatchPolicy, NaiveCs, NaiveFib, NaivePit, NameTable, TableBinding, TableKind};
use crate::domain::{Nic, TableExpr};
use crate::error::{ConfigError, NicError};

/// Constructor for one table variant.
pub type TableFactory = fn(&Nic, &TableExpr) -> Result<Box<dyn NameTable>, ConfigError>;

struct Entry {
    kind: TableKind,
    factory: TableFactory,
}

/// Registry of known table implementations.
pub struct TableRegistry {
    entries: BTreeMap<&'static str, Entry>,
}

impl TableRegistry {
    /// The built-in variants and their short aliases.
    pub fn standard() -> Self {
        let mut registry = Self {
            entries: BTreeMap::new(),
        };
        for name in ["NaiveFib", "Fib"] {
            registry.register(name, TableKind::Fib, naive_fib);
        }
        for name in ["NaivePit", "Pit"] {
            registry.register(name, TableKind::Pit, naive_pit);
        }
        for name in ["NaiveCs", "Cs"] {
            registry.register(name, TableKind::Cs, naive_cs);
        }
        registry
    }

    fn register(&mut self, name: &'static str, kind: TableKind, factory: TableFactory) {
        self.entries.insert(name, Entry { kind, factory });
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Table kind a variant implements.
    pub fn kind_of(&self, name: &str) -> Option<TableKind> {
        self.entries.get(name).map(|entry| entry.kind)
    }

    /// Parse `input` and construct the table it names.
    pub fn resolve(&self, nic: &Nic, input: &str) -> Result<Box<dyn NameTable>, ConfigError> {
        let expr = TableExpr::parse(input)?;
        let entry = self
            .entries
            .get(expr.variant.as_str())
            .ok_or_else(|| ConfigError::UnknownTable {
                name: expr.variant.clone(),
            })?;
        (entry.factory)(nic, &expr)
    }

    /// Construct the table for one slot, checking that the variant fits it.
    pub fn build(&self, nic: &Nic, kind: TableKind, input: &str) -> Result<Box<dyn NameTable>, NicError> {
        let table = self.resolve(nic, input).map_err(|e| NicError::at(kind.origin(), e))?;
        if table.kind() != kind {
            return Err(NicError::at(
                kind.origin(),
                ConfigError::InvalidTableExpression {
                    input: input.to_string(),
                    reason: format!("{} is a {} table, expected {}", table.variant(), table.kind(), kind),
                },
            ));
        }

        let binding = table.binding();
        info!(
            table = %kind,
            variant = table.variant(),
            bank = binding.bank().name(),
            tag = binding.tag(),
            policy = %binding.policy(),
            "table bound"
        );
        Ok(table)
    }
}

fn bind(
    nic: &Nic,
    expr: &TableExpr,
    bank: &str,
    tag: &str,
    policy: MatchPolicy,
) -> Result<TableBinding, ConfigError> {
    let bank = nic.bank(expr.bank.as_deref().unwrap_or(bank))?;
    Ok(TableBinding::new(
        bank,
        expr.tag.as_deref().unwrap_or(tag),
        expr.policy.unwrap_or(policy),
    ))
}

fn naive_fib(nic: &Nic, expr: &TableExpr) -> Result<Box<dyn NameTable>, ConfigError> {
    let binding = bind(nic, expr, NaiveFib::DEFAULT_BANK, NaiveFib::DEFAULT_TAG, NaiveFib::DEFAULT_POLICY)?;
    Ok(Box::new(NaiveFib::with_binding(binding)))
}

fn naive_pit(nic: &Nic, expr: &TableExpr) -> Result<Box<dyn NameTable>, ConfigError> {
    let binding = bind(nic, expr, NaivePit::DEFAULT_BANK, NaivePit::DEFAULT_TAG, NaivePit::DEFAULT_POLICY)?;
    Ok(Box::new(NaivePit::with_binding(binding)))
}

fn naive_cs(nic: &Nic, expr: &TableExpr) -> Result<Box<dyn NameTable>, ConfigError> {
    let binding = bind(nic, expr, NaiveCs::DEFAULT_BANK, NaiveCs::DEFAULT_TAG, NaiveCs::DEFAULT_POLICY)?;
    Ok(Box::new(NaiveCs::with_binding(binding)))
}
