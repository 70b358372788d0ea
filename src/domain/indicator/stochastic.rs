//! Slow stochastic oscillator.
//!
//! raw %K = (C - LL(n)) / (HH(n) - LL(n)) * 100
//! %K     = SMA(raw %K, k_smooth)
//! %D     = SMA(%K, d_period)
//!
//! A bar whose n-bar range is flat has no raw %K; every window that
//! contains it is invalid as well.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_stochastic(
    bars: &[OhlcvBar],
    k_period: usize,
    k_smooth: usize,
    d_period: usize,
) -> IndicatorSeries {
    let indicator_type = IndicatorType::Stochastic {
        k_period,
        k_smooth,
        d_period,
    };
    if k_period == 0 || k_smooth == 0 || d_period == 0 {
        return IndicatorSeries {
            indicator_type,
            values: Vec::new(),
        };
    }

    let raw_k = raw_percent_k(bars, k_period);
    let k = sma(&raw_k, k_smooth);
    let d = sma(&k, d_period);

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (k[i], d[i]) {
            (Some(k), Some(d)) => IndicatorPoint {
                date: bar.date,
                valid: true,
                value: IndicatorValue::Stochastic { k, d },
            },
            (k, d) => IndicatorPoint::invalid(
                bar.date,
                IndicatorValue::Stochastic {
                    k: k.unwrap_or(0.0),
                    d: d.unwrap_or(0.0),
                },
            ),
        })
        .collect();

    IndicatorSeries {
        indicator_type,
        values,
    }
}

fn raw_percent_k(bars: &[OhlcvBar], period: usize) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let highest = window
                .iter()
                .map(|b| b.high)
                .fold(f64::NEG_INFINITY, f64::max);
            let range = highest - lowest;
            if range > 0.0 {
                Some((bars[i].close - lowest) / range * 100.0)
            } else {
                None
            }
        })
        .collect()
}

fn sma(input: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    (0..input.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            input[i + 1 - period..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|s| s / period as f64)
        })
        .collect()
}
