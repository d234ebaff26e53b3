//! Wiring of configuration, NIC banks and table adapters
//!
//! `NicTables` is what a trace driver holds: the NIC plus its three bound
//! tables. Each operation is applied to the table and reported to a
//! `SimulationLog` (bank updates first, then the decision line).

use tracing::{info, warn};

use crate::domain::{Name, Nic, NicConfig};
use crate::error::NicError;
use crate::ports::{Decision, Outcome, SimulationLog, TableOp};
use crate::tables::{NameTable, TableKind, TableRegistry};

#[derive(Debug)]
pub struct NicTables {
    nic: Nic,
    fib: Box<dyn NameTable>,
    pit: Box<dyn NameTable>,
    cs: Box<dyn NameTable>,
}

impl NicTables {
    /// Build banks and tables from `config`.
    ///
    /// Every spec and expression is checked before anything is returned, so
    /// a configuration error never surfaces mid-trace.
    pub fn from_config(config: &NicConfig) -> Result<Self, NicError> {
        config.validate()?;
        let nic = Nic::from_config(config)?;
        let registry = TableRegistry::standard();

        let fib = registry.build(&nic, TableKind::Fib, &config.fib)?;
        let pit = registry.build(&nic, TableKind::Pit, &config.pit)?;
        let cs = registry.build(&nic, TableKind::Cs, &config.cs)?;

        Ok(Self::new(nic, fib, pit, cs))
    }

    pub fn new(nic: Nic, fib: Box<dyn NameTable>, pit: Box<dyn NameTable>, cs: Box<dyn NameTable>) -> Self {
        let tables = Self { nic, fib, pit, cs };
        tables.report_layout();
        tables
    }

    fn report_layout(&self) {
        for bank in self.nic.banks() {
            let users: Vec<&str> = TableKind::ALL
                .into_iter()
                .filter(|&kind| self.table(kind).binding().bank().same_bank(bank))
                .map(|kind| kind.label())
                .collect();
            if users.is_empty() {
                warn!(bank = bank.name(), "memory bank is not bound to any table");
            } else {
                info!(bank = bank.name(), tables = %users.join("+"), "memory bank layout");
            }
        }
    }

    pub fn nic(&self) -> &Nic {
        &self.nic
    }

    pub fn table(&self, kind: TableKind) -> &dyn NameTable {
        match kind {
            TableKind::Fib => self.fib.as_ref(),
            TableKind::Pit => self.pit.as_ref(),
            TableKind::Cs => self.cs.as_ref(),
        }
    }

    /// Apply one operation and log its bank updates and decision.
    pub fn apply(
        &self,
        kind: TableKind,
        op: TableOp,
        name: &Name,
        log: &mut dyn SimulationLog,
    ) -> Result<Decision, NicError> {
        let table = self.table(kind);
        let outcome = match op {
            TableOp::Insert | TableOp::Erase => {
                let updates = if op == TableOp::Insert {
                    table.insert(name)
                } else {
                    table.erase(name)
                };
                for update in &updates {
                    log.record_update(update)?;
                }
                Outcome::Applied
            }
            TableOp::Lookup => match table.find(name) {
                Some(matched) => Outcome::Hit(matched),
                None => Outcome::Miss,
            },
        };

        let decision = Decision {
            table: kind,
            op,
            name: name.clone(),
            outcome,
        };
        log.record_decision(&decision)?;
        Ok(decision)
    }

    pub fn insert(&self, kind: TableKind, name: &Name, log: &mut dyn SimulationLog) -> Result<(), NicError> {
        self.apply(kind, TableOp::Insert, name, log).map(|_| ())
    }

    pub fn erase(&self, kind: TableKind, name: &Name, log: &mut dyn SimulationLog) -> Result<(), NicError> {
        self.apply(kind, TableOp::Erase, name, log).map(|_| ())
    }

    pub fn lookup(&self, kind: TableKind, name: &Name, log: &mut dyn SimulationLog) -> Result<bool, NicError> {
        self.apply(kind, TableOp::Lookup, name, log)
            .map(|decision| decision.is_hit())
    }
}
