//! Line-oriented log sinks
//!
//! `LineLog` writes one record per line. When only one destination is
//! given, decisions and updates are interleaved on it in event order.

use std::io::{self, Write};

use crate::domain::BankUpdate;
use crate::ports::{Decision, SimulationLog};

pub struct LineLog {
    decisions: Box<dyn Write + Send>,
    /// `None` means updates share the decision destination
    updates: Option<Box<dyn Write + Send>>,
}

impl LineLog {
    /// Both logs to one destination.
    pub fn shared<W: Write + Send + 'static>(out: W) -> Self {
        Self {
            decisions: Box::new(out),
            updates: None,
        }
    }

    /// Decisions and updates to separate destinations.
    pub fn split<D, U>(decisions: D, updates: U) -> Self
    where
        D: Write + Send + 'static,
        U: Write + Send + 'static,
    {
        Self {
            decisions: Box::new(decisions),
            updates: Some(Box::new(updates)),
        }
    }

    /// Both logs to standard output.
    pub fn stdout() -> Self {
        Self::shared(io::stdout())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.decisions.flush()?;
        if let Some(updates) = self.updates.as_mut() {
            updates.flush()?;
        }
        Ok(())
    }
}

impl SimulationLog for LineLog {
    fn record_decision(&mut self, decision: &Decision) -> io::Result<()> {
        writeln!(self.decisions, "{}", decision)
    }

    fn record_update(&mut self, update: &BankUpdate) -> io::Result<()> {
        let out = self.updates.as_mut().unwrap_or(&mut self.decisions);
        writeln!(out, "{}", update)
    }
}

/// In-memory log keeping the rendered lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryLog {
    pub decisions: Vec<String>,
    pub updates: Vec<String>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationLog for MemoryLog {
    fn record_decision(&mut self, decision: &Decision) -> io::Result<()> {
        self.decisions.push(decision.to_string());
        Ok(())
    }

    fn record_update(&mut self, update: &BankUpdate) -> io::Result<()> {
        self.updates.push(update.to_string());
        Ok(())
    }
}
