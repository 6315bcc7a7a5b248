//! Error types for planning and strategy edits.
//!
//! [`PlanError`] covers configuration and precondition failures that abort a
//! call. [`StrategyError`] covers policy violations detected while editing
//! target weights; it is always raised before anything is changed.

use crate::asset::Sleeve;
use crate::types::{Pct, Ticker};

/// Precondition or configuration failure.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("targets must sum to 1.0, got {sum:.4}")]
    TargetSum { sum: f64, tolerance: f64 },

    #[error("account cash ({cash:.2}) must equal total value ({total:.2})")]
    CashMismatch { cash: f64, total: f64 },

    #[error("total value must be a finite, non-negative amount, got {0}")]
    InvalidTotal(f64),

    #[error("no accounts configured")]
    NoAccounts,

    #[error("unknown account: {0}")]
    UnknownAccount(String),

    #[error("invalid ticker: {0:?}")]
    InvalidTicker(String),

    #[error("policy error: {0}")]
    InvalidPolicy(String),
}

/// Policy violation raised by a growth-sleeve edit.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    #[error("cannot add {ticker} to the {sleeve} sleeve: edits are for the growth sleeve only")]
    WrongSleeve { ticker: Ticker, sleeve: Sleeve },

    #[error("cannot edit {ticker}: not in growth sleeve")]
    NotGrowthSleeve { ticker: Ticker },

    #[error("cannot add {ticker}: leveraged ETFs are prohibited for long-term holding")]
    Leveraged { ticker: Ticker },

    #[error("cannot add {ticker}: conflicts with {existing} (pick one, not both)")]
    ExclusiveConflict { ticker: Ticker, existing: Ticker },

    #[error("cannot set {ticker} to {}: exceeds single-stock max {}", Pct(*.weight), Pct(*.max))]
    SingleStockMax { ticker: Ticker, weight: f64, max: f64 },

    #[error(
        "cannot add {} to growth sleeve: would exceed cap ({} + {} = {} > {})",
        Pct(*.delta), Pct(*.current), Pct(*.delta), Pct(.current + .delta), Pct(*.cap)
    )]
    GrowthCap { current: f64, delta: f64, cap: f64 },

    #[error("ticker {ticker} not found in targets")]
    UnknownTicker { ticker: Ticker },

    #[error("cannot rotate {} from {ticker}: only has {}", Pct(*.requested), Pct(*.available))]
    InsufficientWeight {
        ticker: Ticker,
        requested: f64,
        available: f64,
    },
}
