//! Recommended trades and the reasons attached to them.

use std::fmt;

use crate::account::AccountKind;
use crate::action::Action;
use crate::asset::{Sleeve, TaxEfficiency};
use crate::types::{Dollars, Ticker};

/// Why a trade was recommended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TradeReason {
    /// Drift sell from the preferred (tax-advantaged) accounts.
    RebalanceSell,
    /// Drift sell that had to reach into a taxable account.
    TaxableLastResort,
    /// Drift buy routed by asset location.
    RebalanceBuy,
    LeveragedProhibited,
    SingleStockExcess(Ticker),
    GrowthSleeveExcess,
    /// First-pass placement at funding time.
    InitialPlacement(Placement),
    /// Second-pass sweep into whichever account still had cash.
    InitialOverflow(AccountKind),
}

/// How an initial-allocation buy matched the asset-location rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// No metadata for the ticker.
    Unclassified,
    Stabilizer { sheltered: bool },
    TaxInefficient { efficiency: TaxEfficiency, sheltered: bool },
    Growth { in_taxable: bool },
    Sleeve(Sleeve),
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeReason::RebalanceSell => write!(f, "Rebalance sell (prefer tax-advantaged)"),
            TradeReason::TaxableLastResort => write!(f, "Taxable sell (last resort)"),
            TradeReason::RebalanceBuy => write!(f, "Rebalance buy (asset-location aware)"),
            TradeReason::LeveragedProhibited => {
                write!(f, "Constraint violation: leveraged ETF must be sold")
            }
            TradeReason::SingleStockExcess(t) => {
                write!(f, "Constraint violation: {t} exceeds single-stock max")
            }
            TradeReason::GrowthSleeveExcess => {
                write!(f, "Constraint violation: growth sleeve exceeds cap")
            }
            TradeReason::InitialPlacement(p) => fmt::Display::fmt(p, f),
            TradeReason::InitialOverflow(kind) => {
                write!(f, "Initial allocation (overflow to {kind})")
            }
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Placement::Unclassified => write!(f, "Initial allocation"),
            Placement::Stabilizer { sheltered: true } => write!(
                f,
                "Initial allocation: stabilizer in tax-advantaged (tax-efficient)"
            ),
            Placement::Stabilizer { sheltered: false } => {
                write!(f, "Initial allocation: stabilizer")
            }
            Placement::TaxInefficient {
                efficiency,
                sheltered: true,
            } => write!(
                f,
                "Initial allocation: {efficiency} tax-efficiency asset in tax-advantaged"
            ),
            Placement::TaxInefficient {
                efficiency,
                sheltered: false,
            } => write!(f, "Initial allocation: {efficiency} tax-efficiency asset"),
            Placement::Growth { in_taxable: true } => {
                write!(f, "Initial allocation: growth asset in taxable (LTCG eligible)")
            }
            Placement::Growth { in_taxable: false } => {
                write!(f, "Initial allocation: growth asset")
            }
            Placement::Sleeve(sleeve) => write!(f, "Initial allocation: {sleeve} sleeve asset"),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TradeReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single recommended trade, valued in aggregate dollars.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trade {
    pub account_id: String,
    pub ticker: Ticker,
    pub action: Action,
    pub value: f64,
    pub reason: TradeReason,
}

impl Trade {
    pub fn buy(account_id: &str, ticker: Ticker, value: f64, reason: TradeReason) -> Self {
        debug_assert!(value > 0.0, "trade value must be positive, got {value}");
        Self {
            account_id: account_id.to_string(),
            ticker,
            action: Action::Buy,
            value,
            reason,
        }
    }

    pub fn sell(account_id: &str, ticker: Ticker, value: f64, reason: TradeReason) -> Self {
        debug_assert!(value > 0.0, "trade value must be positive, got {value}");
        Self {
            account_id: account_id.to_string(),
            ticker,
            action: Action::Sell,
            value,
            reason,
        }
    }

    /// One-line rendering with the reason appended.
    pub fn explain(&self) -> String {
        format!("{self}  |  {}", self.reason)
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.account_id,
            self.action,
            Dollars(self.value),
            self.ticker
        )
    }
}
