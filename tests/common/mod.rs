#![allow(dead_code)]

use chrono::NaiveDate;
use eodtrader::domain::error::EodError;
use eodtrader::domain::evaluation::{AccountState, Timeframe};
use eodtrader::domain::indicator::IndicatorParams;
pub use eodtrader::domain::ohlcv::OhlcvBar;
use eodtrader::domain::sizing::InstrumentQuantization;
use eodtrader::domain::sr_levels::SrLevelSet;
use eodtrader::domain::strategy::StrategyConfig;
use eodtrader::domain::trade_plan::RiskConfig;
use eodtrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, EodError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(EodError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn fx_quantization() -> InstrumentQuantization {
    InstrumentQuantization {
        pip_size: 0.0001,
        pip_value_per_lot: 10.0,
        min_volume: 0.01,
        volume_step: 0.01,
    }
}

/// Oscillating series with a slow upward drift; high/low one unit around close.
pub fn wave_bars(count: usize) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 2);
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 0.05 * x + 5.0 * (x / 3.0).sin();
            OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Config that turns every crossover in `wave_bars` into a trade: levels far
/// below and far above the series, 100% tolerance, counter-trend allowed.
pub fn wave_config() -> StrategyConfig {
    StrategyConfig {
        symbol: "WAVE".into(),
        timeframe: Timeframe::Daily,
        indicators: IndicatorParams::default(),
        risk: RiskConfig {
            risk_percent: 1.0,
            near_sr_tolerance_pct: 100.0,
            allow_counter_trend: true,
            take_profit_r: 2.0,
        },
        levels: SrLevelSet::from_slice(&[50.0, 300.0]),
        quantization: InstrumentQuantization {
            pip_size: 0.01,
            pip_value_per_lot: 1.0,
            min_volume: 0.01,
            volume_step: 0.01,
        },
        account: AccountState { balance: 10_000.0 },
        auto_trade: false,
    }
}
