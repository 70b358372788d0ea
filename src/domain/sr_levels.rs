//! Support/resistance level set.
//!
//! Up to four fixed price levels. A level `<= 0` is disabled and ignored by
//! every query. Duplicates are allowed.

pub const MAX_LEVELS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SrLevelSet {
    levels: [f64; MAX_LEVELS],
}

impl SrLevelSet {
    pub fn new(levels: [f64; MAX_LEVELS]) -> Self {
        Self { levels }
    }

    /// Build from up to four levels; missing slots are disabled and extra
    /// values are dropped.
    pub fn from_slice(values: &[f64]) -> Self {
        let mut levels = [0.0; MAX_LEVELS];
        for (slot, value) in levels.iter_mut().zip(values) {
            *slot = *value;
        }
        Self { levels }
    }

    pub fn slots(&self) -> &[f64; MAX_LEVELS] {
        &self.levels
    }

    /// Enabled levels in slot order.
    pub fn enabled(&self) -> impl Iterator<Item = f64> + '_ {
        self.levels.iter().copied().filter(|&l| l > 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled().next().is_none()
    }

    /// True if any enabled level lies within `price * tolerance_pct / 100` of `price`.
    pub fn is_near(&self, price: f64, tolerance_pct: f64) -> bool {
        let tolerance = price * tolerance_pct / 100.0;
        self.enabled().any(|level| (price - level).abs() <= tolerance)
    }

    /// Level to anchor a protective stop at.
    ///
    /// Takes the closest enabled level (first slot wins ties). If it is not
    /// strictly below `price` for a buy, or strictly above for a sell, the
    /// closest level strictly on the protective side is used instead.
    pub fn nearest_valid_stop(&self, price: f64, is_buy: bool) -> Option<f64> {
        let nearest = closest(self.enabled(), price)?;
        if on_protective_side(nearest, price, is_buy) {
            return Some(nearest);
        }
        closest(
            self.enabled()
                .filter(|&level| on_protective_side(level, price, is_buy)),
            price,
        )
    }
}

fn on_protective_side(level: f64, price: f64, is_buy: bool) -> bool {
    if is_buy { level < price } else { level > price }
}

fn closest(levels: impl Iterator<Item = f64>, price: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for level in levels {
        let dist = (price - level).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((level, dist)),
        }
    }
    best.map(|(level, _)| level)
}
