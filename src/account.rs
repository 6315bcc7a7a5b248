//! Investment accounts: cash plus dollar-valued holdings.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Ticker;

/// Tax treatment of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AccountKind {
    Taxable,
    TaxAdvantaged,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKind::Taxable => write!(f, "taxable"),
            AccountKind::TaxAdvantaged => write!(f, "tax_advantaged"),
        }
    }
}

/// An account snapshot. Holdings are dollar values, not lots or shares.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Account {
    pub id: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: AccountKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cash: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub holdings: BTreeMap<Ticker, f64>,
}

impl Account {
    /// Empty account with no cash and no holdings.
    pub fn new(id: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: id.into(),
            kind,
            cash: 0.0,
            holdings: BTreeMap::new(),
        }
    }

    pub fn with_cash(mut self, cash: f64) -> Self {
        self.cash = cash;
        self
    }

    pub fn with_holding(mut self, ticker: Ticker, value: f64) -> Self {
        self.holdings.insert(ticker, value);
        self
    }

    #[inline]
    pub fn is_tax_advantaged(&self) -> bool {
        self.kind == AccountKind::TaxAdvantaged
    }

    /// Dollar value held of `ticker` (0 if absent).
    #[inline]
    pub fn holding(&self, ticker: &Ticker) -> f64 {
        self.holdings.get(ticker).copied().unwrap_or(0.0)
    }

    /// Cash plus the sum of all holdings.
    pub fn total_value(&self) -> f64 {
        self.cash + self.holdings.values().sum::<f64>()
    }
}
