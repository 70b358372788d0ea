//! Signal log port trait.

use crate::domain::error::EodError;
use crate::domain::evaluation::SignalRecord;
use crate::domain::simulation::TradeOutcome;
use std::path::Path;

/// A signal together with its simulated outcome, if it traded and resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRow<'a> {
    pub symbol: &'a str,
    pub record: &'a SignalRecord,
    pub outcome: Option<TradeOutcome>,
}

pub trait ReportPort {
    fn write_signals(&self, rows: &[SignalRow<'_>], output_path: &Path) -> Result<(), EodError>;
}
