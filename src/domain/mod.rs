//! Core domain types and decision logic.

pub mod ohlcv;
pub mod indicator;
pub mod sr_levels;
pub mod signal;
pub mod sizing;
pub mod trade_plan;
pub mod evaluation;
pub mod simulation;
pub mod strategy;
pub mod config_validation;
pub mod error;
