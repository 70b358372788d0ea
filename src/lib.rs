//! eodtrader: end-of-day EMA/stochastic signals anchored to support/resistance.
//!
//! Hexagonal architecture: decision logic in [`domain`], collaborator traits in
//! [`ports`], concrete implementations in [`adapters`], command dispatch in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
