//! In-memory paper broker.
//!
//! Accepts every well-formed plan and hands out sequential order ids.

use crate::domain::error::EodError;
use crate::domain::trade_plan::TradePlan;
use crate::ports::execution_port::{ExecutionPort, ExecutionReport};
use tracing::info;

#[derive(Debug, Default)]
pub struct PaperExecutionAdapter {
    next_id: u64,
    pub submitted: Vec<ExecutionReport>,
}

impl PaperExecutionAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExecutionPort for PaperExecutionAdapter {
    fn submit(&mut self, symbol: &str, plan: &TradePlan) -> Result<ExecutionReport, EodError> {
        if plan.volume <= 0.0 || plan.stop_price == plan.entry_price {
            return Err(EodError::Execution {
                reason: format!(
                    "malformed plan: volume {} stop {} entry {}",
                    plan.volume, plan.stop_price, plan.entry_price
                ),
            });
        }

        self.next_id += 1;
        let report = ExecutionReport {
            order_id: self.next_id,
            symbol: symbol.to_string(),
            plan: *plan,
        };
        info!(
            order_id = report.order_id,
            symbol,
            side = %plan.direction,
            volume = plan.volume,
            sl = plan.stop_price,
            tp = plan.take_profit_price,
            "order executed"
        );
        self.submitted.push(report.clone());
        Ok(report)
    }
}
