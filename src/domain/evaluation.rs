//! Per-bar evaluation loop.
//!
//! Called once per completed bar. Only bars of the configured timeframe are
//! evaluated, and only at a closed bar index with a closed bar before it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::domain::error::EodError;
use crate::domain::indicator::{IndicatorSet, IndicatorSnapshot};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::trade_plan::{Decision, TradePlanBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    H1,
    H4,
    Daily,
    Weekly,
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h1" | "1h" | "hourly" => Ok(Timeframe::H1),
            "h4" | "4h" => Ok(Timeframe::H4),
            "d1" | "1d" | "daily" => Ok(Timeframe::Daily),
            "w1" | "1w" | "weekly" => Ok(Timeframe::Weekly),
            other => Err(format!("unknown timeframe '{other}'")),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::H1 => "h1",
            Timeframe::H4 => "h4",
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
        };
        write!(f, "{s}")
    }
}

/// Account figures supplied by the broker side on each call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountState {
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    WrongTimeframe,
    InsufficientHistory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    Skipped(SkipReason),
    Decided { date: NaiveDate, decision: Decision },
}

/// One evaluated bar whose signal fired, traded or not.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub index: usize,
    pub date: NaiveDate,
    pub decision: Decision,
}

#[derive(Debug, Clone)]
pub struct EvaluationLoop {
    pub timeframe: Timeframe,
    pub builder: TradePlanBuilder,
}

impl EvaluationLoop {
    pub fn new(timeframe: Timeframe, builder: TradePlanBuilder) -> Self {
        Self { timeframe, builder }
    }

    /// Evaluate the bar at `last_closed`.
    ///
    /// Fails only when indicator values at `last_closed` or the bar before it
    /// are missing.
    pub fn on_bar(
        &self,
        timeframe: Timeframe,
        last_closed: usize,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        account: &AccountState,
    ) -> Result<Evaluation, EodError> {
        if timeframe != self.timeframe {
            debug!(%timeframe, configured = %self.timeframe, "skipping bar on other timeframe");
            return Ok(Evaluation::Skipped(SkipReason::WrongTimeframe));
        }
        if last_closed == 0 || last_closed >= bars.len() {
            debug!(last_closed, bars = bars.len(), "not enough closed bars");
            return Ok(Evaluation::Skipped(SkipReason::InsufficientHistory));
        }

        let snapshot = IndicatorSnapshot::at(indicators, last_closed)?;
        let bar = &bars[last_closed];
        let decision = self.builder.build(&snapshot, bar.close, account.balance);

        match &decision {
            Decision::Trade(plan) => info!(
                date = %bar.date,
                side = %plan.direction,
                price = bar.close,
                stop = plan.stop_price,
                tp = plan.take_profit_price,
                volume = plan.volume,
                "{} signal at close",
                plan.direction
            ),
            Decision::NoTrade(reason) => match reason.direction() {
                Some(direction) => info!(
                    date = %bar.date,
                    price = bar.close,
                    reason = reason.code(),
                    "{} signal at close, no trade",
                    direction
                ),
                None => debug!(date = %bar.date, "no signal"),
            },
        }

        Ok(Evaluation::Decided {
            date: bar.date,
            decision,
        })
    }

    /// Evaluate a live series whose final bar is still forming.
    pub fn on_live_bars(
        &self,
        timeframe: Timeframe,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        account: &AccountState,
    ) -> Result<Evaluation, EodError> {
        match bars.len().checked_sub(2) {
            Some(last_closed) => self.on_bar(timeframe, last_closed, bars, indicators, account),
            None => Ok(Evaluation::Skipped(SkipReason::InsufficientHistory)),
        }
    }

    /// Evaluate every closed bar past indicator warm-up, oldest first.
    ///
    /// Bars whose indicators drop out after warm-up (a flat stochastic range)
    /// are skipped. Returns only bars where a signal fired.
    pub fn replay(
        &self,
        bars: &[OhlcvBar],
        indicators: &IndicatorSet,
        account: &AccountState,
    ) -> Result<Vec<SignalRecord>, EodError> {
        let start = match indicators.warmup() {
            Some(start) => start.max(1),
            None => {
                debug!("indicators never leave warm-up");
                return Ok(Vec::new());
            }
        };

        let mut records = Vec::new();
        let mut gaps = 0usize;
        for index in start..bars.len() {
            if let Err(e) = IndicatorSnapshot::at(indicators, index) {
                debug!(index, date = %bars[index].date, "skipping bar: {e}");
                gaps += 1;
                continue;
            }
            if let Evaluation::Decided { date, decision } =
                self.on_bar(self.timeframe, index, bars, indicators, account)?
            {
                if decision.direction().is_some() {
                    records.push(SignalRecord {
                        index,
                        date,
                        decision,
                    });
                }
            }
        }
        debug!(
            evaluated = bars.len().saturating_sub(start) - gaps,
            skipped = gaps,
            signals = records.len(),
            "replay done"
        );
        Ok(records)
    }
}
