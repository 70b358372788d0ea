//! Execution port trait: hands finished trade plans to a broker.

use crate::domain::error::EodError;
use crate::domain::trade_plan::TradePlan;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub order_id: u64,
    pub symbol: String,
    pub plan: TradePlan,
}

pub trait ExecutionPort {
    fn submit(&mut self, symbol: &str, plan: &TradePlan) -> Result<ExecutionReport, EodError>;
}
