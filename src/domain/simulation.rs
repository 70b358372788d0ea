//! Forward simulation of trade plans against later bars.
//!
//! The stop is checked before the take-profit on every bar, so a bar that
//! spans both counts as a loss. Trades still open at the end are marked to
//! the last close.

use std::fmt;

use chrono::NaiveDate;

use crate::domain::ohlcv::OhlcvBar;
use crate::domain::trade_plan::TradePlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    Open,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "SL"),
            ExitReason::TakeProfit => write!(f, "TP"),
            ExitReason::Open => write!(f, "Open"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeOutcome {
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    /// Price PnL per unit of volume, positive when the trade made money.
    pub pnl: f64,
    pub r_multiple: f64,
}

/// Walk bars dated after `signal_date` until the stop or target is hit.
///
/// Returns `None` when there are no later bars.
pub fn simulate(
    signal_date: NaiveDate,
    plan: &TradePlan,
    bars: &[OhlcvBar],
) -> Option<TradeOutcome> {
    let is_buy = plan.direction.is_buy();
    let mut last: Option<&OhlcvBar> = None;

    for bar in bars.iter().filter(|b| b.date > signal_date) {
        let stop_hit = if is_buy {
            bar.low <= plan.stop_price
        } else {
            bar.high >= plan.stop_price
        };
        if stop_hit {
            return Some(outcome(plan, bar.date, plan.stop_price, ExitReason::StopLoss));
        }
        let target_hit = if is_buy {
            bar.high >= plan.take_profit_price
        } else {
            bar.low <= plan.take_profit_price
        };
        if target_hit {
            return Some(outcome(
                plan,
                bar.date,
                plan.take_profit_price,
                ExitReason::TakeProfit,
            ));
        }
        last = Some(bar);
    }

    last.map(|bar| outcome(plan, bar.date, bar.close, ExitReason::Open))
}

fn outcome(
    plan: &TradePlan,
    exit_date: NaiveDate,
    exit_price: f64,
    exit_reason: ExitReason,
) -> TradeOutcome {
    let pnl = (exit_price - plan.entry_price) * plan.direction.sign();
    let risk = plan.risk_per_unit();
    let r_multiple = if risk > 0.0 { pnl / risk } else { 0.0 };
    TradeOutcome {
        exit_date,
        exit_price,
        exit_reason,
        pnl,
        r_multiple,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulationSummary {
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub open: usize,
    pub total_r: f64,
    /// Largest peak-to-trough fall of cumulative R, in trade order.
    pub max_drawdown_r: f64,
}

impl SimulationSummary {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a TradeOutcome>) -> Self {
        let mut summary = Self::default();
        let mut peak = f64::NEG_INFINITY;
        for o in outcomes {
            summary.trades += 1;
            summary.total_r += o.r_multiple;
            peak = peak.max(summary.total_r);
            summary.max_drawdown_r = summary.max_drawdown_r.max(peak - summary.total_r);
            match o.exit_reason {
                ExitReason::Open => summary.open += 1,
                ExitReason::TakeProfit => summary.wins += 1,
                ExitReason::StopLoss => summary.losses += 1,
            }
        }
        summary
    }

    /// Take-profit exits over all trades, open ones included; 0 with no trades.
    pub fn win_rate(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.wins as f64 / self.trades as f64
        }
    }

    pub fn avg_r(&self) -> f64 {
        if self.trades == 0 {
            0.0
        } else {
            self.total_r / self.trades as f64
        }
    }
}
