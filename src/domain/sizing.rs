//! Risk-percentage position sizing with broker volume quantization.
//!
//! risk_money = balance * risk_pct / 100
//! raw_volume = risk_money / (stop_distance / pip_size * pip_value)
//! volume     = min_volume + floor((raw_volume - min_volume) / step) * step, never below min_volume

/// Fallback used when an instrument reports a pip value `<= 0`.
pub const FALLBACK_PIP_VALUE: f64 = 1.0;

/// Absorbs float noise such as 0.19 / 0.01 = 18.999999999999996.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentQuantization {
    pub pip_size: f64,
    pub pip_value_per_lot: f64,
    pub min_volume: f64,
    pub volume_step: f64,
}

impl InstrumentQuantization {
    /// Pip value with the `<= 0` fallback applied.
    // TODO: replace the 1.0 fallback with a rejection once broker metadata is trusted.
    pub fn effective_pip_value(&self) -> f64 {
        if self.pip_value_per_lot <= 0.0 {
            FALLBACK_PIP_VALUE
        } else {
            self.pip_value_per_lot
        }
    }

    pub fn uses_fallback_pip_value(&self) -> bool {
        self.pip_value_per_lot <= 0.0
    }

    /// Snap a raw volume onto the `min_volume + n * volume_step` grid, rounding down.
    ///
    /// When `min_volume` is not a multiple of `volume_step` this differs from
    /// plain `floor(raw / step) * step` rounding (raw 0.038, min 0.015,
    /// step 0.01: 0.035 here, 0.03 with plain rounding).
    pub fn quantize(&self, raw_volume: f64) -> f64 {
        if !(raw_volume > self.min_volume) {
            return self.min_volume;
        }
        let steps = ((raw_volume - self.min_volume) / self.volume_step + STEP_EPSILON).floor();
        self.min_volume + steps * self.volume_step
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SizingError {
    #[error("stop distance must be positive, got {0}")]
    NonPositiveStopDistance(f64),

    #[error("instrument {field} must be positive")]
    InvalidQuantization { field: &'static str },
}

/// Compute the order volume that risks `risk_pct` of `balance` over `stop_distance`.
pub fn size(
    balance: f64,
    risk_pct: f64,
    stop_distance: f64,
    quantization: &InstrumentQuantization,
) -> Result<f64, SizingError> {
    if !(stop_distance > 0.0) {
        return Err(SizingError::NonPositiveStopDistance(stop_distance));
    }
    if !(quantization.pip_size > 0.0) {
        return Err(SizingError::InvalidQuantization { field: "pip_size" });
    }
    if !(quantization.volume_step > 0.0) {
        return Err(SizingError::InvalidQuantization {
            field: "volume_step",
        });
    }
    if !(quantization.min_volume > 0.0) {
        return Err(SizingError::InvalidQuantization {
            field: "min_volume",
        });
    }

    let risk_money = balance * risk_pct / 100.0;
    let pip_value = quantization.effective_pip_value();
    let raw_volume = risk_money / (stop_distance / quantization.pip_size * pip_value);

    Ok(quantization.quantize(raw_volume))
}
