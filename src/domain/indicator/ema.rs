//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema_values(&closes, period)
        .into_iter()
        .zip(bars)
        .map(|(v, bar)| IndicatorPoint {
            date: bar.date,
            valid: v.is_some(),
            value: IndicatorValue::Simple(v.unwrap_or(0.0)),
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Ema(period),
        values,
    }
}

/// Raw EMA over a value slice; `None` during warm-up. Empty for period 0.
pub(crate) fn ema_values(input: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return Vec::new();
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(input.len());
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &x) in input.iter().enumerate() {
        if i < period - 1 {
            sum += x;
            out.push(None);
        } else if i == period - 1 {
            sum += x;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = x * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }
    out
}
