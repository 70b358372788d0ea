//! Trend + momentum signal detection.
//!
//! Trend comes from the fast/slow EMA relation on the current closed bar;
//! momentum from a %K/%D crossover between the previous and current closed bar.

use std::fmt;

use crate::domain::indicator::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub fn is_buy(self) -> bool {
        matches!(self, Direction::Buy)
    }

    /// +1 for a buy, -1 for a sell.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Buy => 1.0,
            Direction::Sell => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    pub fn direction(self) -> Option<Direction> {
        match self {
            Signal::Buy => Some(Direction::Buy),
            Signal::Sell => Some(Direction::Sell),
            Signal::None => None,
        }
    }
}

/// %K crossed above %D between the previous and current bar.
pub fn stoch_cross_up(k_now: f64, d_now: f64, k_prev: f64, d_prev: f64) -> bool {
    k_prev < d_prev && k_now > d_now
}

/// %K crossed below %D between the previous and current bar.
pub fn stoch_cross_down(k_now: f64, d_now: f64, k_prev: f64, d_prev: f64) -> bool {
    k_prev > d_prev && k_now < d_now
}

/// Evaluate the signal for one closed bar.
///
/// Equal EMAs carry no trend, so without `allow_counter_trend` nothing fires.
pub fn evaluate(
    ema_fast_now: f64,
    ema_slow_now: f64,
    k_now: f64,
    d_now: f64,
    k_prev: f64,
    d_prev: f64,
    allow_counter_trend: bool,
) -> Signal {
    let bull = ema_fast_now > ema_slow_now;
    let bear = ema_fast_now < ema_slow_now;
    let stoch_up = stoch_cross_up(k_now, d_now, k_prev, d_prev);
    let stoch_down = stoch_cross_down(k_now, d_now, k_prev, d_prev);

    if (allow_counter_trend || bull) && stoch_up {
        Signal::Buy
    } else if (allow_counter_trend || bear) && stoch_down {
        Signal::Sell
    } else {
        Signal::None
    }
}

pub fn evaluate_snapshot(snapshot: &IndicatorSnapshot, allow_counter_trend: bool) -> Signal {
    evaluate(
        snapshot.ema_fast,
        snapshot.ema_slow,
        snapshot.k,
        snapshot.d,
        snapshot.k_prev,
        snapshot.d_prev,
        allow_counter_trend,
    )
}
