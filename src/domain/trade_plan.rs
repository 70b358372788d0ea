//! Trade plan construction.
//!
//! One pass per closed bar, no state carried between calls:
//!
//! 1. no signal                       -> `NoTrade(NoSignal)`
//! 2. signal, price not near any SR    -> `NoTrade(NotNearSr)`
//! 3. no SR on the protective side     -> `NoTrade(NoValidStop)`
//! 4. sizing fails                     -> `NoTrade(InvalidRisk | Misconfigured)`
//! 5. otherwise                        -> `Trade(TradePlan)`

use std::fmt;

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::signal::{self, Direction};
use crate::domain::sizing::{self, InstrumentQuantization, SizingError};
use crate::domain::sr_levels::SrLevelSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    /// Percent of balance risked per trade (1.0 = 1%).
    pub risk_percent: f64,
    pub near_sr_tolerance_pct: f64,
    pub allow_counter_trend: bool,
    pub take_profit_r: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_percent: 1.0,
            near_sr_tolerance_pct: 0.5,
            allow_counter_trend: false,
            take_profit_r: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePlan {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub take_profit_price: f64,
    pub volume: f64,
}

impl TradePlan {
    /// Entry-to-stop distance (one R).
    pub fn risk_per_unit(&self) -> f64 {
        (self.entry_price - self.stop_price).abs()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoTradeReason {
    NoSignal,
    NotNearSr { direction: Direction },
    NoValidStop { direction: Direction },
    InvalidRisk { direction: Direction, stop_distance: f64 },
    Misconfigured { direction: Direction, field: &'static str },
}

impl NoTradeReason {
    pub fn code(&self) -> &'static str {
        match self {
            NoTradeReason::NoSignal => "no_signal",
            NoTradeReason::NotNearSr { .. } => "not_near_sr",
            NoTradeReason::NoValidStop { .. } => "no_valid_stop",
            NoTradeReason::InvalidRisk { .. } => "invalid_risk",
            NoTradeReason::Misconfigured { .. } => "misconfigured",
        }
    }

    /// Direction of the signal that was rejected, if there was one.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            NoTradeReason::NoSignal => None,
            NoTradeReason::NotNearSr { direction }
            | NoTradeReason::NoValidStop { direction }
            | NoTradeReason::InvalidRisk { direction, .. }
            | NoTradeReason::Misconfigured { direction, .. } => Some(*direction),
        }
    }
}

impl fmt::Display for NoTradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoTradeReason::NoSignal => write!(f, "no_signal"),
            NoTradeReason::NotNearSr { direction } => {
                write!(f, "not_near_sr ({direction} signal away from SR)")
            }
            NoTradeReason::NoValidStop { direction } => {
                write!(f, "no_valid_stop ({direction} signal, no SR on stop side)")
            }
            NoTradeReason::InvalidRisk { stop_distance, .. } => {
                write!(f, "invalid_risk (stop distance {stop_distance})")
            }
            NoTradeReason::Misconfigured { field, .. } => {
                write!(f, "misconfigured (instrument {field} must be positive)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Trade(TradePlan),
    NoTrade(NoTradeReason),
}

impl Decision {
    pub fn plan(&self) -> Option<&TradePlan> {
        match self {
            Decision::Trade(plan) => Some(plan),
            Decision::NoTrade(_) => None,
        }
    }

    /// Signal direction behind this decision, whether or not a plan came of it.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Decision::Trade(plan) => Some(plan.direction),
            Decision::NoTrade(reason) => reason.direction(),
        }
    }
}

/// Everything the builder reads besides the per-bar inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradePlanBuilder {
    pub levels: SrLevelSet,
    pub risk: RiskConfig,
    pub quantization: InstrumentQuantization,
}

impl TradePlanBuilder {
    pub fn new(
        levels: SrLevelSet,
        risk: RiskConfig,
        quantization: InstrumentQuantization,
    ) -> Self {
        Self {
            levels,
            risk,
            quantization,
        }
    }

    pub fn build(&self, snapshot: &IndicatorSnapshot, entry_price: f64, balance: f64) -> Decision {
        let direction = match signal::evaluate_snapshot(snapshot, self.risk.allow_counter_trend)
            .direction()
        {
            Some(direction) => direction,
            None => return Decision::NoTrade(NoTradeReason::NoSignal),
        };
        self.plan_for(direction, entry_price, balance)
    }

    /// Steps 2-5 for an already detected signal.
    pub fn plan_for(&self, direction: Direction, entry_price: f64, balance: f64) -> Decision {
        if !self
            .levels
            .is_near(entry_price, self.risk.near_sr_tolerance_pct)
        {
            return Decision::NoTrade(NoTradeReason::NotNearSr { direction });
        }

        let stop_price = match self
            .levels
            .nearest_valid_stop(entry_price, direction.is_buy())
        {
            Some(level) => level,
            None => return Decision::NoTrade(NoTradeReason::NoValidStop { direction }),
        };

        let stop_distance = (entry_price - stop_price).abs();
        let volume = match sizing::size(
            balance,
            self.risk.risk_percent,
            stop_distance,
            &self.quantization,
        ) {
            Ok(volume) => volume,
            Err(SizingError::NonPositiveStopDistance(d)) => {
                return Decision::NoTrade(NoTradeReason::InvalidRisk {
                    direction,
                    stop_distance: d,
                });
            }
            Err(SizingError::InvalidQuantization { field }) => {
                return Decision::NoTrade(NoTradeReason::Misconfigured { direction, field });
            }
        };

        let take_profit_price = entry_price + direction.sign() * self.risk.take_profit_r * stop_distance;

        Decision::Trade(TradePlan {
            direction,
            entry_price,
            stop_price,
            take_profit_price,
            volume,
        })
    }
}
