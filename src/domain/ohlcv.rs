//! Closed price bar.
//!
//! A bar's ordinal index is its position in the slice it is passed in; slices
//! are always sorted by date, oldest first.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
