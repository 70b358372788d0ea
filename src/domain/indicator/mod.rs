//! Indicator series and the per-bar snapshot the decision core reads.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorValue`: single-line or stochastic %K/%D output
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series aligned index-for-index with the bars
//! - `IndicatorSet`: the three series the strategy needs
//! - `IndicatorSnapshot`: current and previous values at one closed bar

pub mod ema;
pub mod stochastic;

use std::fmt;

use chrono::NaiveDate;

use crate::domain::error::EodError;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: IndicatorValue,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate, value: IndicatorValue) -> Self {
        Self {
            date,
            valid: false,
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Stochastic { k: f64, d: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Stochastic {
        k_period: usize,
        k_smooth: usize,
        d_period: usize,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Stochastic {
                k_period,
                k_smooth,
                d_period,
            } => write!(f, "STOCHASTIC({},{},{})", k_period, k_smooth, d_period),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Single-line value at `index`, if present and past warm-up.
    pub fn simple_at(&self, index: usize) -> Option<f64> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Simple(v),
                ..
            }) => Some(*v),
            _ => None,
        }
    }

    /// (%K, %D) at `index`, if present and past warm-up.
    pub fn stochastic_at(&self, index: usize) -> Option<(f64, f64)> {
        match self.values.get(index) {
            Some(IndicatorPoint {
                valid: true,
                value: IndicatorValue::Stochastic { k, d },
                ..
            }) => Some((*k, *d)),
            _ => None,
        }
    }

    /// Index of the first valid point.
    pub fn first_valid(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

/// Periods used to build an [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub stoch_k: usize,
    pub stoch_k_smooth: usize,
    pub stoch_d: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: 5,
            ema_slow: 10,
            stoch_k: 14,
            stoch_k_smooth: 3,
            stoch_d: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub ema_fast: IndicatorSeries,
    pub ema_slow: IndicatorSeries,
    pub stochastic: IndicatorSeries,
}

impl IndicatorSet {
    pub fn compute(bars: &[OhlcvBar], params: &IndicatorParams) -> Self {
        Self {
            ema_fast: ema::calculate_ema(bars, params.ema_fast),
            ema_slow: ema::calculate_ema(bars, params.ema_slow),
            stochastic: stochastic::calculate_stochastic(
                bars,
                params.stoch_k,
                params.stoch_k_smooth,
                params.stoch_d,
            ),
        }
    }

    /// First bar index at which a snapshot can be taken (needs a valid previous bar too).
    pub fn warmup(&self) -> Option<usize> {
        let fast = self.ema_fast.first_valid()?;
        let slow = self.ema_slow.first_valid()?;
        let stoch = self.stochastic.first_valid()?;
        Some(fast.max(slow).max(stoch + 1))
    }
}

/// Indicator values at the last closed bar and the one before it.
///
/// Only the stochastic needs its previous value; the EMAs are read at the
/// current bar only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub k: f64,
    pub d: f64,
    pub k_prev: f64,
    pub d_prev: f64,
}

impl IndicatorSnapshot {
    pub fn at(set: &IndicatorSet, index: usize) -> Result<Self, EodError> {
        let missing = |series: &IndicatorSeries, index: usize| EodError::MissingIndicator {
            series: series.indicator_type.to_string(),
            index,
        };

        let prev = index
            .checked_sub(1)
            .ok_or_else(|| missing(&set.stochastic, index))?;
        let ema_fast = set
            .ema_fast
            .simple_at(index)
            .ok_or_else(|| missing(&set.ema_fast, index))?;
        let ema_slow = set
            .ema_slow
            .simple_at(index)
            .ok_or_else(|| missing(&set.ema_slow, index))?;
        let (k, d) = set
            .stochastic
            .stochastic_at(index)
            .ok_or_else(|| missing(&set.stochastic, index))?;
        let (k_prev, d_prev) = set
            .stochastic
            .stochastic_at(prev)
            .ok_or_else(|| missing(&set.stochastic, prev))?;

        Ok(Self {
            ema_fast,
            ema_slow,
            k,
            d,
            k_prev,
            d_prev,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::set_from;
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Ema(5).to_string(), "EMA(5)");
        let stoch = IndicatorType::Stochastic {
            k_period: 14,
            k_smooth: 3,
            d_period: 3,
        };
        assert_eq!(stoch.to_string(), "STOCHASTIC(14,3,3)");
    }

    #[test]
    fn snapshot_reads_current_and_previous() {
        let set = set_from(
            &[Some(1.0), Some(1.2050)],
            &[Some(1.0), Some(1.2030)],
            &[Some((18.0, 22.0)), Some((25.0, 20.0))],
        );
        let snap = IndicatorSnapshot::at(&set, 1).unwrap();
        assert_eq!(snap.ema_fast, 1.2050);
        assert_eq!(snap.ema_slow, 1.2030);
        assert_eq!((snap.k, snap.d), (25.0, 20.0));
        assert_eq!((snap.k_prev, snap.d_prev), (18.0, 22.0));
    }

    #[test]
    fn snapshot_fails_on_warmup_value() {
        let set = set_from(
            &[Some(1.0), Some(1.1)],
            &[None, None],
            &[Some((18.0, 22.0)), Some((25.0, 20.0))],
        );
        let err = IndicatorSnapshot::at(&set, 1).unwrap_err();
        assert!(
            matches!(err, EodError::MissingIndicator { ref series, index: 1 } if series == "EMA(10)")
        );
    }

    #[test]
    fn snapshot_fails_without_previous_bar() {
        let set = set_from(&[Some(1.0)], &[Some(1.0)], &[Some((1.0, 2.0))]);
        assert!(IndicatorSnapshot::at(&set, 0).is_err());
    }

    #[test]
    fn snapshot_fails_out_of_range() {
        let set = set_from(&[Some(1.0)], &[Some(1.0)], &[Some((1.0, 2.0))]);
        assert!(IndicatorSnapshot::at(&set, 5).is_err());
    }

    #[test]
    fn warmup_needs_previous_stochastic() {
        let set = set_from(
            &[None, Some(1.0), Some(1.0), Some(1.0)],
            &[None, None, Some(1.0), Some(1.0)],
            &[None, None, Some((1.0, 1.0)), Some((1.0, 1.0))],
        );
        assert_eq!(set.warmup(), Some(3));
    }
}
