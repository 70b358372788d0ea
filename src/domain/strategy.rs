//! Strategy configuration: everything a run needs besides market data.

use crate::domain::evaluation::{AccountState, EvaluationLoop, Timeframe};
use crate::domain::indicator::IndicatorParams;
use crate::domain::sizing::InstrumentQuantization;
use crate::domain::sr_levels::SrLevelSet;
use crate::domain::trade_plan::{RiskConfig, TradePlanBuilder};

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub indicators: IndicatorParams,
    pub risk: RiskConfig,
    pub levels: SrLevelSet,
    pub quantization: InstrumentQuantization,
    pub account: AccountState,
    /// Submit plans to the execution port instead of only reporting them.
    pub auto_trade: bool,
}

impl StrategyConfig {
    pub fn evaluation_loop(&self) -> EvaluationLoop {
        EvaluationLoop::new(
            self.timeframe,
            TradePlanBuilder::new(self.levels, self.risk, self.quantization),
        )
    }
}
