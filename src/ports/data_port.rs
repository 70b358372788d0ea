//! Market-data port trait.

use crate::domain::error::EodError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars for `symbol`, oldest first.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, EodError>;
}
