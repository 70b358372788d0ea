//! Configuration validation.
//!
//! Validates all config fields before a run. Missing keys fall back to their
//! defaults, so only present-but-invalid values fail here.

use crate::domain::error::EodError;
use crate::domain::evaluation::Timeframe;
use crate::domain::sr_levels::MAX_LEVELS;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), EodError> {
    validate_strategy_section(config)?;
    validate_risk_section(config)?;
    validate_levels(config)?;
    validate_instrument(config)?;
    validate_account(config)?;
    Ok(())
}

pub fn validate_strategy_section(config: &dyn ConfigPort) -> Result<(), EodError> {
    if let Some(tf) = config.get_string("strategy", "timeframe") {
        tf.parse::<Timeframe>()
            .map_err(|reason| EodError::invalid("strategy", "timeframe", reason))?;
    }
    for key in ["ema_fast", "ema_slow", "stoch_k", "stoch_k_smooth", "stoch_d"] {
        let Some(raw) = config.get_string("strategy", key) else {
            continue;
        };
        match raw.trim().parse::<i64>() {
            Ok(period) if period >= 1 => {}
            Ok(_) => {
                return Err(EodError::invalid(
                    "strategy",
                    key,
                    format!("{key} must be at least 1"),
                ));
            }
            Err(_) => {
                return Err(EodError::invalid(
                    "strategy",
                    key,
                    format!("'{raw}' is not a whole number"),
                ));
            }
        }
    }
    Ok(())
}

/// A present value must parse as a finite number; absent keys yield `None`.
fn finite_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, EodError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(EodError::invalid(
            section,
            key,
            format!("'{raw}' is not a finite number"),
        )),
    }
}

pub fn validate_risk_section(config: &dyn ConfigPort) -> Result<(), EodError> {
    if let Some(risk) = finite_number(config, "risk", "risk_percent")? {
        if risk <= 0.0 || risk > 100.0 {
            return Err(EodError::invalid(
                "risk",
                "risk_percent",
                "risk_percent must be between 0 and 100",
            ));
        }
    }
    if let Some(tol) = finite_number(config, "risk", "near_sr_tolerance_pct")? {
        if tol < 0.0 {
            return Err(EodError::invalid(
                "risk",
                "near_sr_tolerance_pct",
                "near_sr_tolerance_pct must be non-negative",
            ));
        }
    }
    if let Some(tp) = finite_number(config, "risk", "take_profit_r")? {
        if tp <= 0.0 {
            return Err(EodError::invalid(
                "risk",
                "take_profit_r",
                "take_profit_r must be positive",
            ));
        }
    }
    Ok(())
}

fn validate_levels(config: &dyn ConfigPort) -> Result<(), EodError> {
    for slot in 1..=MAX_LEVELS {
        finite_number(config, "levels", &format!("sr{slot}"))?;
    }
    Ok(())
}

fn validate_instrument(config: &dyn ConfigPort) -> Result<(), EodError> {
    for key in ["pip_size", "min_volume", "volume_step"] {
        if let Some(v) = finite_number(config, "instrument", key)? {
            if v <= 0.0 {
                return Err(EodError::invalid(
                    "instrument",
                    key,
                    format!("{key} must be positive"),
                ));
            }
        }
    }
    // any finite pip_value is accepted; <= 0 falls back at sizing time
    finite_number(config, "instrument", "pip_value")?;
    Ok(())
}

fn validate_account(config: &dyn ConfigPort) -> Result<(), EodError> {
    if let Some(balance) = finite_number(config, "account", "balance")? {
        if balance <= 0.0 {
            return Err(EodError::invalid(
                "account",
                "balance",
                "balance must be positive",
            ));
        }
    }
    Ok(())
}
